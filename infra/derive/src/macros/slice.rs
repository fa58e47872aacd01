use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{ItemStruct, LitStr, parse::Parser};

/// Expands `#[taxi_slice]` / `#[taxi_slice(name = "...")]`.
pub fn expand_slice(args: TokenStream, input: ItemStruct) -> TokenStream {
    let name = match parse_slice_name(args) {
        Ok(name) => name,
        Err(err) => return err,
    };

    let handle = &input.ident;
    let vis = &input.vis;
    let fields = &input.fields;
    let attrs = &input.attrs;
    let inner = format_ident!("{handle}Inner");
    let name = name.map_or_else(|| handle.to_string().to_lowercase(), |lit| lit.value());

    let fields = if matches!(fields, syn::Fields::Named(_)) {
        quote! { #fields }
    } else {
        quote! { #fields; }
    };

    quote! {
        #(#attrs)*
        #[derive(Debug, Clone)]
        #vis struct #inner #fields

        #[derive(Debug, Clone)]
        #vis struct #handle {
            inner: std::sync::Arc<#inner>,
        }

        impl #handle {
            pub const NAME: &'static str = #name;

            pub fn new(inner: #inner) -> Self {
                Self { inner: std::sync::Arc::new(inner) }
            }
        }

        impl std::ops::Deref for #handle {
            type Target = #inner;
            fn deref(&self) -> &Self::Target {
                &self.inner
            }
        }

        impl ::taxi_kernel::domain::registry::FeatureSlice for #handle {
            fn name(&self) -> &'static str {
                Self::NAME
            }

            fn as_any(&self) -> &dyn std::any::Any {
                self
            }
        }
    }
}

fn parse_slice_name(args: TokenStream) -> Result<Option<LitStr>, TokenStream> {
    if args.is_empty() {
        return Ok(None);
    }

    let mut name = None;
    let parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("name") {
            name = Some(meta.value()?.parse::<LitStr>()?);
            Ok(())
        } else {
            Err(meta.error("Unsupported argument; expected `name = \"...\"`"))
        }
    });
    parser.parse2(args).map_err(|err| err.to_compile_error())?;

    Ok(name)
}
