use quote::{format_ident, quote};
use proc_macro::TokenStream;
use syn::DeriveInput;

pub fn impl_component(ast: &DeriveInput) -> TokenStream {
    let name = &ast.ident;

    let name_str = name.to_string().to_uppercase();
    let id_name = format_ident!("__COMPONENT_ID_OF_{}", name_str);

    let gen = quote! {
        chunk_ecs::lazy_static! {
            static ref #id_name: chunk_ecs::components::ComponentId =
                chunk_ecs::components::TypeInfoTable::register::<#name>();
        }

        impl chunk_ecs::components::Component for #name {
            #[inline(always)]
            fn component_id() -> chunk_ecs::components::ComponentId {
                *#id_name
            }
        }

        impl chunk_ecs::components::ComponentTypeInfo for #name {
            type ComponentType = #name;

            #[inline(always)]
            fn component_id() -> chunk_ecs::components::ComponentId {
                <#name as chunk_ecs::components::Component>::component_id()
            }
        }
    };
    gen.into()
}
