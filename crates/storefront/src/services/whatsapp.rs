//! WhatsApp checkout links.
//!
//! There is no cart or payment flow: a purchase opens a WhatsApp chat with
//! the store, pre-filled with the product and its price.

use friends_store_core::Product;

/// Pre-filled chat message for buying `product`.
#[must_use]
pub fn purchase_message(product: &Product) -> String {
    format!(
        "Hi! I would like to purchase:\n\n🌿 {}\n💰 Price: ₹{}\n\nPlease share the payment details.",
        product.name, product.price
    )
}

/// `wa.me` link that opens a chat with `number` about `product`.
#[must_use]
pub fn purchase_url(number: &str, product: &Product) -> String {
    format!(
        "https://wa.me/{number}?text={}",
        urlencoding::encode(&purchase_message(product))
    )
}
