//! Text rendering of an aggregated shopping cart.

use std::fmt::Write;

use crate::domain::repo::ShoppingItem;

pub const HEADER: &str = "Список покупок:";
pub const FOOTER: &str = "Конец списка";

/// Render rows (already grouped and sorted by the store) as a plain-text list.
///
/// The output is a pure function of `items`, so a fixed cart always yields
/// byte-identical text.
pub fn render(items: &[ShoppingItem]) -> String {
    let mut out = String::with_capacity(32 + items.len() * 32);
    out.push_str(HEADER);
    out.push_str("\n\n");
    for item in items {
        let _ = writeln!(
            out,
            "- {} ({}) — {}",
            item.name, item.measurement_unit, item.total
        );
    }
    out.push('\n');
    out.push_str(FOOTER);
    out
}
