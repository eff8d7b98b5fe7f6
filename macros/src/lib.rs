use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, spanned::Spanned, Ident, ItemFn, LitStr};

/// Test attribute shared by the unit and integration tests.
///
/// - `#[rxstream_macro::test]` on a sync fn expands to `#[test]`.
/// - `#[rxstream_macro::test]` on an async fn runs it on a current-thread
///   tokio runtime.
/// - `#[rxstream_macro::test(local)]` additionally pauses the tokio clock and
///   runs the body inside a `LocalSet`, so `spawn_local` based schedulers work.
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
  let input = parse_macro_input!(item as ItemFn);
  let is_async = input.sig.asyncness.is_some();
  let raw_args = proc_macro2::TokenStream::from(attr);

  let local = if raw_args.is_empty() {
    false
  } else {
    if !is_async {
      return TokenStream::from(
        syn::Error::new(
          raw_args.span(),
          "rxstream_macro::test flavor args are only supported for async tests. Use \
           #[rxstream_macro::test] for sync tests, or make the function async.",
        )
        .to_compile_error(),
      );
    }

    let flavor = if let Ok(ident) = syn::parse2::<Ident>(raw_args.clone()) {
      Some((ident.to_string(), ident.span()))
    } else if let Ok(lit) = syn::parse2::<LitStr>(raw_args.clone()) {
      Some((lit.value(), lit.span()))
    } else {
      None
    };

    match flavor {
      Some((name, _)) if name == "local" => true,
      Some((_, span)) => {
        return TokenStream::from(
          syn::Error::new(span, "rxstream_macro::test only accepts: `local` or \"local\"")
            .to_compile_error(),
        );
      }
      None => {
        return TokenStream::from(
          syn::Error::new(
            raw_args.span(),
            "rxstream_macro::test only accepts: #[rxstream_macro::test] or \
             #[rxstream_macro::test(local)]",
          )
          .to_compile_error(),
        );
      }
    }
  };

  let expanded = if !is_async {
    quote! {
      #[test]
      #input
    }
  } else if local {
    let ItemFn { attrs, vis, sig, block } = input;
    quote! {
      #(#attrs)*
      #[tokio::test(flavor = "current_thread", start_paused = true)]
      #vis #sig {
        tokio::task::LocalSet::new().run_until(async move #block).await
      }
    }
  } else {
    quote! {
      #[tokio::test(flavor = "current_thread")]
      #input
    }
  };

  TokenStream::from(expanded)
}
