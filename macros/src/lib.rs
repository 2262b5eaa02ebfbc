//! Derive macros for the Roster state container
//!
//! This crate provides procedural macros to reduce boilerplate when building
//! action catalogs.
//!
//! # Available Macros
//!
//! - `#[derive(Action)]` - Implements `roster_core::action::Action` for an action enum
//!
//! # Example
//!
//! ```ignore
//! use roster_macros::Action;
//!
//! #[derive(Action, Clone, Debug)]
//! enum TodoAction {
//!     #[request]
//!     LoadTodos,
//!
//!     #[success]
//!     LoadTodosSuccess { todos: Vec<Todo> },
//!
//!     #[failure]
//!     LoadTodosFailure { error: String },
//!
//!     Clear,
//! }
//!
//! // Generated trait methods:
//! assert!(TodoAction::LoadTodos.is_request());
//! assert!(TodoAction::Clear.action_type() == "[Todo] Clear");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, Ident, Variant, parse_macro_input};

/// Derive macro for action enums
///
/// Implements `roster_core::action::Action`:
/// - `action_type()` - `"[Feature] Variant"`, where `Feature` is the enum name
///   without a trailing `Action`
/// - `is_request()` - true for variants marked `#[request]`
/// - `is_success()` - true for variants marked `#[success]`
/// - `is_failure()` - true for variants marked `#[failure]`
///
/// Unmarked variants (selection, reset, ...) are neither.
///
/// # Attributes
///
/// - `#[request]` - The variant starts an asynchronous request
/// - `#[success]` - The variant reports a successful request
/// - `#[failure]` - The variant reports a failed request
///
/// # Errors
///
/// Produces a compile error (not a runtime panic) if:
/// - Applied to a non-enum type
/// - A variant carries more than one of the three markers
#[proc_macro_derive(Action, attributes(request, success, failure))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Data::Enum(data_enum) = &input.data else {
        return syn::Error::new_spanned(input, "#[derive(Action)] can only be used on enums")
            .to_compile_error()
            .into();
    };

    let feature = feature_name(name);

    let mut requests = Vec::new();
    let mut successes = Vec::new();
    let mut failures = Vec::new();

    for variant in &data_enum.variants {
        let markers = [
            has_attribute(&variant.attrs, "request"),
            has_attribute(&variant.attrs, "success"),
            has_attribute(&variant.attrs, "failure"),
        ];

        if markers.iter().filter(|marked| **marked).count() > 1 {
            return syn::Error::new_spanned(
                variant,
                "Variant can carry only one of #[request], #[success] and #[failure]",
            )
            .to_compile_error()
            .into();
        }

        if markers[0] {
            requests.push(pattern(variant));
        } else if markers[1] {
            successes.push(pattern(variant));
        } else if markers[2] {
            failures.push(pattern(variant));
        }
    }

    let type_arms = data_enum.variants.iter().map(|variant| {
        let pattern = pattern(variant);
        let type_name = format!("[{feature}] {}", variant.ident);
        quote! { #pattern => #type_name, }
    });

    let is_request = matcher(&requests);
    let is_success = matcher(&successes);
    let is_failure = matcher(&failures);

    let expanded = quote! {
        impl #impl_generics ::roster_core::action::Action for #name #ty_generics #where_clause {
            fn action_type(&self) -> &'static str {
                match self {
                    #(#type_arms)*
                }
            }

            fn is_request(&self) -> bool {
                #is_request
            }

            fn is_success(&self) -> bool {
                #is_success
            }

            fn is_failure(&self) -> bool {
                #is_failure
            }
        }
    };

    TokenStream::from(expanded)
}

/// `UserAction` → `User`; names without the suffix are used as-is
fn feature_name(name: &Ident) -> String {
    let name = name.to_string();
    match name.strip_suffix("Action") {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => name,
    }
}

/// Match pattern for a variant regardless of its field shape
fn pattern(variant: &Variant) -> TokenStream2 {
    let ident = &variant.ident;
    match &variant.fields {
        Fields::Named(_) => quote! { Self::#ident { .. } },
        Fields::Unnamed(_) => quote! { Self::#ident(..) },
        Fields::Unit => quote! { Self::#ident },
    }
}

/// `matches!` over a set of variant patterns (false when the set is empty)
fn matcher(patterns: &[TokenStream2]) -> TokenStream2 {
    if patterns.is_empty() {
        quote! { false }
    } else {
        quote! { matches!(self, #(#patterns)|*) }
    }
}

/// Helper function to check if an attribute list contains a specific attribute
fn has_attribute(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident(name))
}

#[cfg(test)]
mod tests {
    // Macro tests live in tests/ directory
}
