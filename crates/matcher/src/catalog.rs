use crate::matcher::AssignmentOutput;
use crate::model::{ProductListing, UnifiedProduct};

/// Merge an assignment into the unified catalog.
///
/// One record per A listing, in A order, then every unused B listing in B
/// order. Records carrying both prices are moved ahead of the rest without
/// reordering either group, and ids are assigned from 1 afterwards.
pub fn build_catalog(
    a: &[ProductListing],
    b: &[ProductListing],
    assignment: &AssignmentOutput,
) -> Vec<UnifiedProduct> {
    let mut products = Vec::with_capacity(a.len() + b.len());

    for (listing, partner) in a.iter().zip(&assignment.partner) {
        let matched = partner.and_then(|bi| b.get(bi));
        products.push(UnifiedProduct {
            id: 0,
            title: listing.title.clone(),
            image: listing.image.clone(),
            rating: listing.rating,
            is_prime: listing.is_prime,
            amazon_price: listing.effective_price(),
            amazon_link: priced_link(listing),
            flipkart_price: matched.and_then(ProductListing::effective_price),
            flipkart_link: matched.and_then(priced_link),
        });
    }

    for (listing, used) in b.iter().zip(&assignment.used) {
        if *used {
            continue;
        }
        products.push(UnifiedProduct {
            id: 0,
            title: listing.title.clone(),
            image: listing.image.clone(),
            rating: listing.rating,
            is_prime: false,
            amazon_price: None,
            amazon_link: None,
            flipkart_price: listing.effective_price(),
            flipkart_link: priced_link(listing),
        });
    }

    order_and_number(products)
}

/// A catalog's link is only reported alongside its price.
fn priced_link(listing: &ProductListing) -> Option<String> {
    listing.effective_price().and(listing.link.clone())
}

/// Stable partition on `has_comparison`, then renumber from 1.
pub fn order_and_number(products: Vec<UnifiedProduct>) -> Vec<UnifiedProduct> {
    let (mut ordered, rest): (Vec<_>, Vec<_>) =
        products.into_iter().partition(UnifiedProduct::has_comparison);
    ordered.extend(rest);

    for (i, p) in ordered.iter_mut().enumerate() {
        p.id = i + 1;
    }
    ordered
}
