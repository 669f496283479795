//! One-shot cart operations.
//!
//! Each command runs the full coordination flow — submit (optimistic),
//! backend call, complete — even though a single CLI invocation has nothing
//! to supersede. The printed outcome is the same `applied`/`failed` contract
//! the daemon speaks.

use anyhow::{anyhow, bail, Context, Result};

use nb_cart::{
    AddLineInput, CartCoordinator, CommerceBackend, Completion, LineUpdateInput, MutationRequest,
    ProductReader,
};
use nb_schemas::Merchandise;

use super::{backend_from_env, ShopBackend};

pub fn show() -> Result<()> {
    let (backend, _) = backend_from_env()?;
    let cart = backend
        .fetch_cart()
        .map_err(|e| anyhow!(e))
        .context("fetching cart")?;
    println!("{}", serde_json::to_string_pretty(&cart)?);
    Ok(())
}

pub fn add(merchandise_id: &str, quantity: u32) -> Result<()> {
    let (backend, featured_handle) = backend_from_env()?;
    let merchandise = find_merchandise(backend.as_ref(), &featured_handle, merchandise_id)?;
    run_mutation(
        backend.as_ref(),
        MutationRequest::AddLines {
            lines: vec![AddLineInput {
                merchandise,
                quantity: quantity.max(1),
            }],
        },
    )
}

pub fn update(line_id: &str, quantity: u32) -> Result<()> {
    let (backend, _) = backend_from_env()?;
    run_mutation(
        backend.as_ref(),
        MutationRequest::UpdateLines {
            lines: vec![LineUpdateInput {
                id: line_id.to_string(),
                quantity,
            }],
        },
    )
}

pub fn remove(line_id: &str) -> Result<()> {
    let (backend, _) = backend_from_env()?;
    run_mutation(
        backend.as_ref(),
        MutationRequest::RemoveLines {
            line_ids: vec![line_id.to_string()],
        },
    )
}

fn find_merchandise(
    backend: &dyn ShopBackend,
    featured_handle: &str,
    merchandise_id: &str,
) -> Result<Merchandise> {
    let cart = backend.fetch_cart().map_err(|e| anyhow!(e))?;
    if let Some(line) = cart.line_for_merchandise(merchandise_id) {
        return Ok(line.merchandise.clone());
    }

    let reader: &dyn ProductReader = backend;
    let product = nb_cart::resolve_featured_product(reader, featured_handle)
        .map_err(|e| anyhow!(e))
        .context("resolving featured product")?;
    product
        .first_variant
        .filter(|v| v.id == merchandise_id)
        .ok_or_else(|| anyhow!("unknown merchandise: {merchandise_id}"))
}

fn run_mutation(backend: &dyn ShopBackend, request: MutationRequest) -> Result<()> {
    let confirmed = backend.fetch_cart().map_err(|e| anyhow!(e))?;
    let mut coordinator = CartCoordinator::new(confirmed);

    let ticket = coordinator.submit(request.clone());
    let outcome = backend.apply(&request);
    let completion = coordinator.complete(&ticket, outcome);

    match completion {
        Completion::Applied => {
            println!("outcome: applied");
            println!(
                "{}",
                serde_json::to_string_pretty(&coordinator.displayed())?
            );
            Ok(())
        }
        Completion::Superseded => {
            // Unreachable in a one-shot flow, but keep the contract honest.
            println!("outcome: superseded");
            Ok(())
        }
        Completion::Failed(err) => bail!("cart mutation failed: {err}"),
    }
}
