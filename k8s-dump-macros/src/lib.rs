use proc_macro::TokenStream;
use quote::quote;
use syn::{
    parse_macro_input, punctuated::Punctuated, token::Comma, Data, DeriveInput, Field, Fields,
    Ident,
};

/// Implements `crate::output::TableOutputRow` for a struct with named fields.
///
/// Column headers are the uppercased field names, cells are the `Display` output of
/// each field and the field marked with `#[name_column]` is what `names` output prints.
#[proc_macro_derive(TableOutputRow, attributes(name_column))]
pub fn derive_table_output_row(input: TokenStream) -> TokenStream {
    let parsed_input = parse_macro_input!(input as DeriveInput);
    let struct_ident = parsed_input.ident;
    let (impl_generics, type_generics, where_clause) = parsed_input.generics.split_for_impl();
    let parsed_struct = match parsed_input.data {
        Data::Struct(s) => s,
        _ => panic!("This derive macro is only applicable to named structs!"),
    };
    let fields = match parsed_struct.fields {
        Fields::Named(fields) => fields.named,
        _ => panic!("This derive macro is only applicable to named structs!"),
    };
    let name_field = get_name_column_field(&fields);
    let column_names = get_column_names(&fields);
    let field_names = fields
        .iter()
        .filter_map(|f| f.ident.as_ref())
        .collect::<Vec<_>>();
    let field_count = field_names.len();

    let output = quote! {
        impl #impl_generics crate::output::TableOutputRow for #struct_ident #type_generics #where_clause {
            fn get_name(&self) -> ::std::string::String {
                ::std::string::ToString::to_string(&self.#name_field)
            }

            fn get_column_names() -> ::std::vec::Vec<::std::string::String> {
                ::std::vec![#(::std::string::String::from(#column_names)),*]
            }

            fn get_column_count() -> usize {
                #field_count
            }

            fn get_row(&self) -> ::std::vec::Vec<::std::string::String> {
                ::std::vec![#(::std::string::ToString::to_string(&self.#field_names)),*]
            }
        }
    };

    output.into()
}

fn get_column_names(fields: &Punctuated<Field, Comma>) -> Vec<String> {
    fields
        .iter()
        .filter_map(|f| f.ident.as_ref())
        .map(|ident| ident.to_string().to_uppercase())
        .collect()
}

fn get_name_column_field(fields: &Punctuated<Field, Comma>) -> &Ident {
    fields
        .iter()
        .find(|f| {
            f.attrs
                .iter()
                .any(|a| a.meta.path().is_ident("name_column"))
        })
        .and_then(|f| f.ident.as_ref())
        .expect("This struct is missing a 'name_column' attribute!")
}
