use proc_macro::TokenStream;
use quote::quote;
use syn::{
    punctuated::Punctuated, token::Comma, Attribute, ExprClosure, FnArg, Pat, PatType,
    PathArguments, Type, TypePath,
};

/// Wrap a test case in setup and tear down boiler plate, including manipulating
/// settings if needed.
///
/// If other test macros are used, such as the [`parameterized`
/// crate](https://crates.io/crates/parameterized), the attributes for those
/// macros should be placed below the `keywords_test` macro. Additionally, the
/// settings closure can specify arguments that will be available on the
/// resulting function, for use by `parameterized`.
///
/// # Example:
///
/// Basic usage:
///
/// ```ignore
/// use keywords_integration_tests::{keywords_test_macro, TestingTools};
///
/// #[keywords_test_macro]
/// async fn test_function(TestingTools { test_client, .. }: TestingTools) {
///     // test using test_client
/// }
/// ```
///
/// Settings can be customized:
///
/// ```ignore
/// use keywords_integration_tests::{keywords_test_macro, TestingTools};
///
/// #[keywords_test_macro(|settings| settings.log_full_request = false)]
/// async fn test_function(TestingTools { test_client, .. }: TestingTools) {
///     // test using test_client while keywords are kept out of the logs.
/// }
/// ```
///
/// Other test macros, like `parameterized`, can be used:
///
/// ```ignore
/// use keywords_integration_tests::{TestingTools, keywords_test_macro};
/// use parameterized::parameterized;
/// use std::time::Duration;
///
/// #[keywords_test_macro(|settings, timeout_ms: u64| settings.upstream.request_timeout = Duration::from_millis(timeout_ms))]
/// #[parameterized(timeout_ms = { 300, 600 })]
/// async fn test(TestingTools { .. }: TestingTools) {
///     // test will run twice, once with each timeout.
/// }
/// ```
///
#[proc_macro_attribute]
pub fn keywords_test(attributes: TokenStream, item: TokenStream) -> TokenStream {
    // Parse the function that this macro is attached to.
    let mut input = syn::parse_macro_input!(item as syn::ItemFn);
    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &mut input.sig;
    let body = &input.block;

    // `parameterized` adds `#[test]` itself, so only add one if neither is present.
    let missing_test_attr = if attrs.iter().any(provides_test_attr) {
        quote!()
    } else {
        quote!(#[test])
    };

    // The async body runs on a runtime started by the generated function, which
    // is itself sync.
    if sig.asyncness.is_none() {
        return syn::Error::new_spanned(
            sig.fn_token,
            "the async keyword is missing from the function declaration",
        )
        .to_compile_error()
        .into();
    }
    sig.asyncness = None;

    // Take the `TestingTools` arg out, keeping its pattern so the bindings the
    // body expects still exist. Any other args stay on the outer function.
    let original_args = sig.inputs.clone();
    let mut toplevel_args = Punctuated::<FnArg, Comma>::new();
    let mut testing_tools_arg = None;

    for arg in original_args.iter() {
        match arg {
            FnArg::Typed(PatType { ty, .. }) if is_testing_tools(ty) => {
                testing_tools_arg = Some(arg.clone());
            }
            _ => toplevel_args.push(arg.clone()),
        }
    }

    let testing_tools_arg = match testing_tools_arg {
        Some(arg) => arg,
        None => {
            return syn::Error::new_spanned(
                original_args,
                "expected an argument of type TestingTools",
            )
            .into_compile_error()
            .into()
        }
    };

    // The settings closure in the macro invocation can also contribute
    // arguments. These arguments can be used by other macros like
    // parameterized.
    let settings_body = if attributes.is_empty() {
        quote!({})
    } else {
        let settings_closure = syn::parse_macro_input!(attributes as ExprClosure);
        for arg in settings_closure.inputs {
            match arg {
                Pat::Ident(pat) if pat.ident == "settings" => (),
                Pat::Type(pat) => toplevel_args.push(FnArg::Typed(pat)),
                _ => {
                    return syn::Error::new_spanned(
                        arg,
                        "only `val: Type` parameters can be used for keywords_test settings inputs",
                    )
                    .into_compile_error()
                    .into()
                }
            }
        }
        let closure_body = settings_closure.body;
        quote!({ #closure_body })
    };

    sig.inputs = toplevel_args;

    (quote! {
        #(#attrs)*
        #missing_test_attr
        #vis #sig {
            actix_rt::System::new()
                .block_on(async {
                    // crate here refers to `keywords-integration-tests`
                    crate::keywords_test(
                        |settings| { #settings_body },
                        | #testing_tools_arg | async move { #body }
                    ).await
                })
        }
    })
    .into()
}

/// Whether `attr` is `#[test]`, or a `parameterized` attribute that adds one.
fn provides_test_attr(attr: &Attribute) -> bool {
    if attr.path.is_ident("test") {
        return true;
    }
    let segment_names: Vec<_> = attr
        .path
        .segments
        .iter()
        .map(|segment| segment.ident.to_string())
        .collect();
    segment_names == ["parameterized"] || segment_names == ["parameterized", "parameterized"]
}

/// Whether `ty` names `TestingTools`, by its last path segment.
fn is_testing_tools(ty: &Type) -> bool {
    match ty {
        Type::Path(TypePath { qself: None, path }) => path.segments.last().map_or(false, |segment| {
            matches!(segment.arguments, PathArguments::None) && segment.ident == "TestingTools"
        }),
        _ => false,
    }
}
