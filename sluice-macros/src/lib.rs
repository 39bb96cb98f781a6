mod decode_field;

use decode_field::decode_field;
use proc_macro::TokenStream;
use quote::quote;
use syn::{Fields, ItemStruct, parse_macro_input};

/// Implements `FromRecord`, one setter per named field.
///
/// A field matches the column whose name, without whitespace, equals the
/// field name in PascalCase (`first_name` matches `First Name`). Use
/// `#[sluice(name = "...")]` to match another column and `#[sluice(skip)]` to
/// leave a field at its default. The struct must implement `Default`.
#[proc_macro_derive(FromRecord, attributes(sluice))]
pub fn derive_from_record(input: TokenStream) -> TokenStream {
    let item: ItemStruct = parse_macro_input!(input as ItemStruct);
    let name = &item.ident;
    let (impl_generics, ty_generics, where_clause) = item.generics.split_for_impl();
    let Fields::Named(fields) = &item.fields else {
        panic!("FromRecord can only be derived for structs with named fields");
    };
    let fields = fields
        .named
        .iter()
        .map(decode_field)
        .filter(|v| !v.skip)
        .map(|v| {
            let ident = &v.ident;
            let ty = &v.ty;
            let column = &v.name;
            quote! {
                ::sluice::Field::new(#column, |record: &mut Self, value: ::sluice::Value| {
                    record.#ident = <#ty as ::sluice::AsValue>::try_from_value(value)?;
                    Ok(())
                })
            }
        });
    quote! {
        impl #impl_generics ::sluice::FromRecord for #name #ty_generics #where_clause {
            fn fields() -> ::std::vec::Vec<::sluice::Field<Self>> {
                ::std::vec![#(#fields),*]
            }
        }
    }
    .into()
}
