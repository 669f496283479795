//! GraphQL documents for the Storefront API.
//!
//! Fragments are shared across documents; each `*_query`/`*_mutation`
//! function returns a complete request body with every fragment it needs
//! appended.

/// Full variant selection, including the parent product reference needed to
/// build a cart line's merchandise.
pub const VARIANT_FRAGMENT: &str = r#"
  fragment VariantFields on ProductVariant {
    id
    title
    availableForSale
    price {
      amount
      currencyCode
    }
    image {
      url
      altText
      width
      height
    }
    selectedOptions {
      name
      value
    }
    product {
      title
      handle
    }
  }
"#;

/// Product selection used by both the by-handle and first-product queries.
pub const PRODUCT_FRAGMENT: &str = r#"
  fragment ProductFields on Product {
    id
    title
    handle
    vendor
    description
    featuredImage {
      url
      altText
      width
      height
    }
    priceRange {
      minVariantPrice {
        amount
        currencyCode
      }
    }
    variants(first: 1) {
      nodes {
        ...VariantFields
      }
    }
    metafields(identifiers: [
      {namespace: "custom", key: "size"},
      {namespace: "custom", key: "texture"},
      {namespace: "custom", key: "scent"},
      {namespace: "custom", key: "ingredients"},
      {namespace: "custom", key: "benefits"}
    ]) {
      namespace
      key
      value
    }
  }
"#;

/// Cart selection returned by the cart query and every line mutation.
pub const CART_FRAGMENT: &str = r#"
  fragment CartFields on Cart {
    id
    checkoutUrl
    totalQuantity
    cost {
      subtotalAmount {
        amount
        currencyCode
      }
    }
    lines(first: 50) {
      nodes {
        id
        quantity
        cost {
          totalAmount {
            amount
            currencyCode
          }
        }
        merchandise {
          ... on ProductVariant {
            ...VariantFields
          }
        }
      }
    }
  }
"#;

fn document(body: &str, fragments: &[&str]) -> String {
    let mut doc = body.to_string();
    for f in fragments {
        doc.push_str(f);
    }
    doc
}

pub fn product_by_handle_query() -> String {
    document(
        r#"
  query ProductByHandle(
    $handle: String!
    $country: CountryCode
    $language: LanguageCode
  ) @inContext(country: $country, language: $language) {
    product(handle: $handle) {
      ...ProductFields
    }
  }
"#,
        &[PRODUCT_FRAGMENT, VARIANT_FRAGMENT],
    )
}

/// Fallback: the most recently updated product in the shop.
pub fn first_product_query() -> String {
    document(
        r#"
  query FirstProduct(
    $country: CountryCode
    $language: LanguageCode
  ) @inContext(country: $country, language: $language) {
    products(first: 1, sortKey: UPDATED_AT, reverse: true) {
      nodes {
        ...ProductFields
      }
    }
  }
"#,
        &[PRODUCT_FRAGMENT, VARIANT_FRAGMENT],
    )
}

pub fn cart_query() -> String {
    document(
        r#"
  query Cart($cartId: ID!) {
    cart(id: $cartId) {
      ...CartFields
    }
  }
"#,
        &[CART_FRAGMENT, VARIANT_FRAGMENT],
    )
}

pub fn cart_create_mutation() -> String {
    document(
        r#"
  mutation CartCreate {
    cartCreate {
      cart {
        ...CartFields
      }
      userErrors {
        field
        message
      }
    }
  }
"#,
        &[CART_FRAGMENT, VARIANT_FRAGMENT],
    )
}

pub fn cart_lines_add_mutation() -> String {
    document(
        r#"
  mutation CartLinesAdd($cartId: ID!, $lines: [CartLineInput!]!) {
    cartLinesAdd(cartId: $cartId, lines: $lines) {
      cart {
        ...CartFields
      }
      userErrors {
        field
        message
      }
    }
  }
"#,
        &[CART_FRAGMENT, VARIANT_FRAGMENT],
    )
}

pub fn cart_lines_update_mutation() -> String {
    document(
        r#"
  mutation CartLinesUpdate($cartId: ID!, $lines: [CartLineUpdateInput!]!) {
    cartLinesUpdate(cartId: $cartId, lines: $lines) {
      cart {
        ...CartFields
      }
      userErrors {
        field
        message
      }
    }
  }
"#,
        &[CART_FRAGMENT, VARIANT_FRAGMENT],
    )
}

pub fn cart_lines_remove_mutation() -> String {
    document(
        r#"
  mutation CartLinesRemove($cartId: ID!, $lineIds: [ID!]!) {
    cartLinesRemove(cartId: $cartId, lineIds: $lineIds) {
      cart {
        ...CartFields
      }
      userErrors {
        field
        message
      }
    }
  }
"#,
        &[CART_FRAGMENT, VARIANT_FRAGMENT],
    )
}
