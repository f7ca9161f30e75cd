//! # Cart Page
//!
//! Server-rendered HTML for the cart page. Every button is a small form
//! posting back to the cart routes.

use cart_core::{CartView, Currency, Navigation};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fmt::Write;

/// Everything but RFC 3986 unreserved characters
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode one path segment
pub fn segment(raw: &str) -> String {
    utf8_percent_encode(raw, PATH_SEGMENT).to_string()
}

/// Base path of a cart page
pub fn cart_path(locale: &str, cart_id: &str) -> String {
    format!("/{}/cart/{}", segment(locale), segment(cart_id))
}

/// Render the full cart page
pub fn render_cart_page(
    view: &CartView,
    navigation: &Navigation,
    cart_id: &str,
    notice: Option<&str>,
) -> String {
    let base = cart_path(&view.locale, cart_id);
    let mut body = String::new();

    body.push_str("<nav class=\"site-nav\">");
    for link in &navigation.pages {
        let _ = write!(
            body,
            "<a href=\"{}\">{}</a>",
            escape(&link.href),
            escape(&link.title)
        );
    }
    body.push_str("</nav>\n");

    if let Some(notice) = notice {
        let _ = writeln!(body, "<div class=\"notice\" role=\"alert\">{}</div>", escape(notice));
    }

    let _ = writeln!(
        body,
        "<form method=\"post\" action=\"{}/empty\"><button type=\"submit\">Empty</button></form>",
        escape(&base)
    );

    for line in &view.lines {
        let item_base = format!("{}/items/{}", base, segment(&line.id));
        let _ = write!(
            body,
            r#"<div class="flex items-center" data-item="{id}">
  <div class="w-1/6"><img src="{src}" width="{w}" height="{h}" alt="{name}"></div>
  <div><a href="{href}">{name}</a></div>
  <div class="flex items-center space-x-2">
    <form method="post" action="{item}/decrement"><button type="submit">&#8210;</button></form>
    <span class="quantity">{qty}</span>
    <form method="post" action="{item}/increment"><button type="submit">&#43;</button></form>
  </div>
  <div><form method="post" action="{item}/remove"><button type="submit">Remove</button></form></div>
  <div class="line-total">{total}</div>
</div>
"#,
            id = escape(&line.id),
            src = escape(&line.image.url),
            w = line.image.width,
            h = line.image.height,
            name = escape(&line.name),
            href = escape(&line.href),
            item = escape(&item_base),
            qty = line.quantity,
            total = escape(&line.line_total),
        );
    }

    let _ = writeln!(body, "<p class=\"text-xl cart-total\">{}</p>", escape(&view.total));

    body.push_str(&currency_selector(&base, view.currency));

    let _ = writeln!(
        body,
        "<form method=\"post\" action=\"{}/checkout\"><button type=\"submit\">Checkout</button></form>",
        escape(&base)
    );

    format!(
        "<!DOCTYPE html>\n<html lang=\"{lang}\">\n<head><meta charset=\"utf-8\"><title>Cart</title></head>\n<body>\n{body}</body>\n</html>\n",
        lang = escape(&view.locale),
        body = body
    )
}

fn currency_selector(base: &str, active: Currency) -> String {
    let mut out = format!(
        "<form method=\"post\" action=\"{}/currency\"><select name=\"currency\">",
        escape(base)
    );
    for currency in Currency::ALL {
        let selected = if currency == active { " selected" } else { "" };
        let _ = write!(
            out,
            "<option value=\"{code}\"{selected}>{code}</option>",
            code = currency.code(),
            selected = selected
        );
    }
    out.push_str("</select><button type=\"submit\">Set currency</button></form>\n");
    out
}

/// Minimal HTML escaping for text and attribute values
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use cart_core::{CartItem, CartStore, ItemImage, MemoryCartStore, NavLink, Settings};

    fn view() -> CartView {
        let mut store = MemoryCartStore::new();
        store
            .add_item(
                CartItem::new(
                    "sku-1",
                    1000,
                    ItemImage {
                        url: "https://cdn.example.com/shirt.png".into(),
                        width: 400,
                        height: 300,
                    },
                )
                .with_locale("en", "Shirt <XL>", "shirt"),
                2,
            )
            .unwrap();
        CartView::build(&store, &Settings::new(Currency::USD), "en")
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_renders_lines_and_total() {
        let nav = Navigation {
            pages: vec![NavLink {
                title: "Home".into(),
                href: "/".into(),
            }],
        };
        let html = render_cart_page(&view(), &nav, "c1", None);

        assert!(html.contains(r#"<div class="line-total">$20.00</div>"#));
        assert!(html.contains(r#"<p class="text-xl cart-total">$20.00</p>"#));
        assert!(html.contains(r#"<a href="/products/shirt">Shirt &lt;XL&gt;</a>"#));
        assert!(html.contains(r#"action="/en/cart/c1/items/sku-1/decrement""#));
        assert!(html.contains(r#"<a href="/">Home</a>"#));
        assert!(html.contains(r#"<option value="USD" selected>"#));
        assert!(!html.contains("role=\"alert\""));
    }

    #[test]
    fn test_paths_encode_segments() {
        assert_eq!(cart_path("en", "c1"), "/en/cart/c1");
        assert_eq!(cart_path("en", "a/b c"), "/en/cart/a%2Fb%20c");
        assert_eq!(segment("shirt-xl_v2.~"), "shirt-xl_v2.~");
    }

    #[test]
    fn test_item_actions_encode_item_id() {
        let mut store = MemoryCartStore::new();
        store
            .add_item(
                CartItem::new(
                    "shirt/xl",
                    1000,
                    ItemImage {
                        url: "https://cdn.example.com/shirt.png".into(),
                        width: 1,
                        height: 1,
                    },
                ),
                1,
            )
            .unwrap();
        let view = CartView::build(&store, &Settings::default(), "en");
        let html = render_cart_page(&view, &Navigation::default(), "c1", None);

        assert!(html.contains(r#"action="/en/cart/c1/items/shirt%2Fxl/decrement""#));
        assert!(!html.contains("items/shirt/xl"));
    }

    #[test]
    fn test_renders_notice() {
        let html = render_cart_page(&view(), &Navigation::default(), "c1", Some("Try again"));
        assert!(html.contains(r#"<div class="notice" role="alert">Try again</div>"#));
    }
}
