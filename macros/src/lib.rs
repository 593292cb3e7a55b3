extern crate proc_macro;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{quote, quote_spanned};
use syn::spanned::Spanned;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Index};

/// Derives `dg_wallet_serialize::ChiaSerialize` by encoding each field in declaration order.
/// Field-less enums encode as a single discriminant byte and must implement `From<u8>`.
#[proc_macro_derive(ChiaSerial)]
pub fn derive_chia_serial(input: TokenStream) -> TokenStream {
    let input: DeriveInput = parse_macro_input!(input);
    let name = input.ident;
    let (to_bytes, from_bytes) = match field_codecs(&input.data) {
        Ok(codecs) => codecs,
        Err(e) => return e.to_compile_error().into(),
    };
    let gen = quote! {
        impl dg_wallet_serialize::ChiaSerialize for #name {
            fn to_bytes(&self) -> Vec<u8> {
                #to_bytes
            }
            fn from_bytes<T: AsRef<[u8]>>(bytes: &mut std::io::Cursor<T>) -> Result<Self, std::io::Error>
            where
                Self: Sized,
            {
                #from_bytes
            }
        }
    };
    gen.into()
}

fn field_codecs(data: &Data) -> Result<(TokenStream2, TokenStream2), syn::Error> {
    match data {
        Data::Struct(s) => match &s.fields {
            Fields::Named(fields) => {
                let writes = fields.named.iter().map(|f| {
                    let name = &f.ident;
                    quote_spanned! {f.span()=>
                        bytes.extend(dg_wallet_serialize::ChiaSerialize::to_bytes(&self.#name));
                    }
                });
                let reads = fields.named.iter().map(|f| {
                    let name = &f.ident;
                    quote_spanned! {f.span()=>
                        #name: dg_wallet_serialize::ChiaSerialize::from_bytes(bytes)?,
                    }
                });
                Ok((
                    quote! {
                        let mut bytes = vec![];
                        #(#writes)*
                        bytes
                    },
                    quote! {
                        Ok(Self {
                            #(#reads)*
                        })
                    },
                ))
            }
            Fields::Unnamed(fields) => {
                let writes = fields.unnamed.iter().enumerate().map(|(i, f)| {
                    let index = Index::from(i);
                    quote_spanned! {f.span()=>
                        bytes.extend(dg_wallet_serialize::ChiaSerialize::to_bytes(&self.#index));
                    }
                });
                let reads = fields.unnamed.iter().map(|f| {
                    quote_spanned! {f.span()=>
                        dg_wallet_serialize::ChiaSerialize::from_bytes(bytes)?,
                    }
                });
                Ok((
                    quote! {
                        let mut bytes = vec![];
                        #(#writes)*
                        bytes
                    },
                    quote! {
                        Ok(Self(
                            #(#reads)*
                        ))
                    },
                ))
            }
            Fields::Unit => Err(syn::Error::new(
                s.struct_token.span(),
                "ChiaSerial cannot be derived for unit structs",
            )),
        },
        Data::Enum(e) => Ok((
            quote_spanned! {e.enum_token.span()=>
                vec![*self as u8]
            },
            quote_spanned! {e.enum_token.span()=>
                use std::io::Read;
                let mut enum_buf: [u8; 1] = [0; 1];
                bytes.read_exact(&mut enum_buf)?;
                Ok(enum_buf[0].into())
            },
        )),
        Data::Union(u) => Err(syn::Error::new(
            u.union_token.span(),
            "ChiaSerial cannot be derived for unions",
        )),
    }
}
