use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, FnArg, Ident, ItemFn, Pat, Signature, Type};

/// Transform an asynchronous test into a synchronous one, inject a local
/// client over a freshly deployed example campus, and enable logging.
///
/// The only injectable dependency is [`rocket::local::asynchronous::Client`].
/// Passing `modules` registers the example modules on every registry before
/// the test starts.
#[proc_macro_attribute]
pub fn backend_test(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut item_fn = parse_macro_input!(input as ItemFn);

    // Extract type information and reject invalid function signatures.
    let test_args = match check_sig(item_fn.sig.clone()) {
        Ok(args) => args,
        Err(err) => {
            return err.into_compile_error().into();
        }
    };

    // Rename the future so the test can have its original name.
    let name = item_fn.sig.ident.clone();
    let new_name = format_ident!("{}_fut", name);
    item_fn.sig.ident = new_name.clone();

    // Register the example modules if needed.
    let maybe_modules = match parse_macro_input!(args as Option<Ident>) {
        None => TokenStream2::new(),
        Some(arg) if arg == "modules" => quote! {
            let owner = crate::model::common::AccountId::from("admin");
            let modules = [
                crate::model::registry::Module::example1(),
                crate::model::registry::Module::example2(),
            ];
            for id in 0..crate::config::Config::example().registries() {
                campus
                    .registry_mut(id)
                    .unwrap()
                    .register_modules(&owner, &modules)
                    .unwrap();
            }
        },
        Some(arg) => {
            return syn::Error::new(arg.span(), "Expected no argument or `modules`")
                .into_compile_error()
                .into();
        }
    };

    // Rewrite the test function.
    quote! {
        #[test]
        fn #name() {
            /// Test setup.
            async fn setup() -> rocket::local::asynchronous::Client {
                #[allow(unused_mut)]
                let mut campus = crate::config::Config::example().deploy().unwrap();

                #maybe_modules

                rocket::local::asynchronous::Client::tracked(crate::rocket_for_campus(campus))
                    .await
                    .unwrap()
            }

            /// The test itself.
            #item_fn

            // This test enters backend code, so enable logging.
            log4rs_test_utils::test_logging::init_logging_once_for(["campus_stake"], None, None);

            let runtime = rocket::tokio::runtime::Builder::new_multi_thread()
                .thread_name("rocket-worker-test-thread")
                .worker_threads(1)
                .enable_all()
                .build()
                .unwrap();

            runtime.block_on(async {
                let rocket_client = setup().await;
                #new_name(#(#test_args),*).await;
            });
        }
    }
    .into()
}

/// Ensure the wrapped test is async, extract parameters to inject, and reject unknown parameters.
fn check_sig(sig: Signature) -> Result<Vec<TokenStream2>, syn::Error> {
    if sig.asyncness.is_none() {
        return Err(syn::Error::new(sig.span(), "Test must be marked `async`"));
    }

    let mut args = vec![];

    for input in &sig.inputs {
        if let FnArg::Typed(pat_type) = input {
            if let (Pat::Ident(_), Type::Path(type_path)) = (&*pat_type.pat, &*pat_type.ty) {
                let is_client = type_path
                    .path
                    .segments
                    .last()
                    .map_or(false, |segment| segment.ident == "Client");
                if is_client {
                    if !args.is_empty() {
                        return Err(syn::Error::new(
                            input.span(),
                            "Test cannot accept more than one `rocket::local::asynchronous::Client`",
                        ));
                    }
                    args.push(quote! { rocket_client });
                    continue;
                }
            }
        }

        return Err(syn::Error::new(
            input.span(),
            "Expected `client_ident: Client`",
        ));
    }

    Ok(args)
}
