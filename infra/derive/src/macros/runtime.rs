use proc_macro2::TokenStream;
use quote::quote;
use syn::{Error, Ident, ItemFn, ReturnType, Type};

const PROFILES: &str = "server, default";

/// Expands `#[taxi_runtime::main]` / `#[taxi_runtime::main(server)]`.
#[must_use]
pub fn expand_main(args: TokenStream, input: ItemFn) -> TokenStream {
    match check_signature(&input).and_then(|()| profile(args)) {
        Ok(profile) => wrap(&input, &profile),
        Err(err) => err.to_compile_error(),
    }
}

fn check_signature(input: &ItemFn) -> syn::Result<()> {
    let sig = &input.sig;
    if sig.asyncness.is_none() {
        return Err(Error::new_spanned(sig.fn_token, "#[taxi_runtime::main] needs an `async fn`"));
    }
    if !sig.inputs.is_empty() {
        return Err(Error::new_spanned(&sig.inputs, "#[taxi_runtime::main] takes no arguments"));
    }
    if !returns_result(&sig.output) {
        return Err(Error::new_spanned(
            &sig.output,
            "#[taxi_runtime::main] needs a `Result` return type so runtime errors can propagate",
        ));
    }
    Ok(())
}

fn profile(args: TokenStream) -> syn::Result<TokenStream> {
    if args.is_empty() {
        return Ok(quote! { ::taxi_runtime::RuntimeConfig::default() });
    }

    let ident: Ident = syn::parse2(args)?;
    match ident.to_string().as_str() {
        "server" => Ok(quote! { ::taxi_runtime::RuntimeConfig::server() }),
        "default" => Ok(quote! { ::taxi_runtime::RuntimeConfig::default() }),
        other => Err(Error::new_spanned(
            &ident,
            format!("unknown runtime profile `{other}`, expected one of: {PROFILES}"),
        )),
    }
}

fn wrap(input: &ItemFn, profile: &TokenStream) -> TokenStream {
    let ItemFn { attrs, vis, sig, block } = input;
    let name = &sig.ident;
    let output = &sig.output;

    quote! {
        #(#attrs)*
        #vis fn #name() #output {
            ::taxi_runtime::build_runtime_with_config(&#profile)?.block_on(async move #block)
        }
    }
}

fn returns_result(output: &ReturnType) -> bool {
    match output {
        ReturnType::Type(_, ty) => match &**ty {
            Type::Path(path) => path.path.segments.last().is_some_and(|seg| seg.ident == "Result"),
            _ => false,
        },
        ReturnType::Default => false,
    }
}
