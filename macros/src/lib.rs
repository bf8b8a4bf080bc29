//! Procedural macros for the tapline event bus.
//!
//! - `#[derive(Event)]`: Implements `tapline::Event` for your type, preserving
//!   generics and bounds. The event type defaults to the type name in
//!   kebab-case; override it with `#[event(name = "...")]`.
//!
//! Usage:
//! ```rust,ignore
//! use tapline::Event;
//!
//! // Published as "beer-data-fetched"
//! #[derive(Event)]
//! struct BeerDataFetched(Vec<Beer>);
//!
//! // Published as "analysis-complete"
//! #[derive(Event)]
//! #[event(name = "analysis-complete")]
//! struct Summary { total_beers: usize }
//! ```
use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, LitStr, parse_macro_input};

#[proc_macro_derive(Event, attributes(event))]
pub fn derive_event(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let ident = &input.ident;

    let name = match event_name(&input) {
        Ok(Some(name)) => name,
        Ok(None) => LitStr::new(&kebab_case(&ident.to_string()), ident.span()),
        Err(e) => return e.to_compile_error().into(),
    };

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::tapline::Event for #ident #ty_generics #where_clause {
            const NAME: &'static str = #name;
        }
    };
    TokenStream::from(expanded)
}

fn event_name(input: &DeriveInput) -> syn::Result<Option<LitStr>> {
    let mut name = None;
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("event")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                if value.value().is_empty() {
                    return Err(meta.error("event name must not be empty"));
                }
                name = Some(value);
                Ok(())
            } else {
                Err(meta.error("unsupported event attribute, expected `name`"))
            }
        })?;
    }
    Ok(name)
}

/// `BeerDataFetched` -> `beer-data-fetched`, `HTTPRequest` -> `http-request`.
fn kebab_case(ident: &str) -> String {
    let chars: Vec<char> = ident.trim_start_matches("r#").chars().collect();
    let mut out = String::with_capacity(chars.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c == '_' {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
            continue;
        }
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if boundary && !out.ends_with('-') {
                out.push('-');
            }
        }
        out.extend(c.to_lowercase());
    }
    out
}
