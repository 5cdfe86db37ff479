use quote::{format_ident, quote};
use proc_macro::TokenStream;
use syn::DeriveInput;

pub fn impl_tag(ast: &DeriveInput) -> TokenStream {
    let name = &ast.ident;

    let name_str = name.to_string().to_uppercase();
    let id_name = format_ident!("__TAG_ID_OF_{}", name_str);

    let gen = quote! {
        chunk_ecs::lazy_static! {
            static ref #id_name: chunk_ecs::components::TagId =
                chunk_ecs::components::TypeInfoTable::register_tag(
                    ::std::any::type_name::<#name>()
                );
        }

        impl chunk_ecs::components::Tag for #name {
            #[inline(always)]
            fn tag_id() -> chunk_ecs::components::TagId {
                *#id_name
            }
        }
    };
    gen.into()
}
