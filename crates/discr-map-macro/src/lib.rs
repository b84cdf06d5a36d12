use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::{Ident, Result, Token, Visibility, braced, token};

use proc_macro_crate::{FoundCrate, crate_name};

/// One declared class: optional tag, name, nested subclasses.
struct Node {
    name: Ident,
    /// Discriminator tag from `#[discr = "..."]`, if declared.
    tag: Option<String>,
    children: Vec<Node>,
}

struct HierarchyInput {
    vis: Visibility,
    root: Ident,
    nodes: Vec<Node>,
}

impl Parse for HierarchyInput {
    fn parse(input: ParseStream) -> Result<Self> {
        let vis: Visibility = input.parse()?;
        input.parse::<Token![mod]>()?;
        let root: Ident = input.parse()?;
        let content;
        braced!(content in input);
        let nodes = parse_nodes(&content)?;
        Ok(Self { vis, root, nodes })
    }
}

fn parse_nodes(input: ParseStream) -> Result<Vec<Node>> {
    let mut nodes = Vec::new();
    while !input.is_empty() {
        let tag = parse_discr_attr(input)?;
        let name: Ident = input.parse()?;

        // Subclasses in braces, or a semicolon for a leaf class
        if input.peek(token::Brace) {
            let content;
            braced!(content in input);
            let children = parse_nodes(&content)?;
            nodes.push(Node {
                name,
                tag,
                children,
            });
        } else {
            input.parse::<Token![;]>()?;
            nodes.push(Node {
                name,
                tag,
                children: Vec::new(),
            });
        }
    }
    Ok(nodes)
}

/// Parse `#[discr = "..."]`.
///
/// The declaration attaches at class level only and carries exactly one
/// string-valued attribute; anything else is rejected at expansion time.
fn parse_discr_attr(input: ParseStream) -> Result<Option<String>> {
    let mut tag: Option<String> = None;

    while input.peek(Token![#]) {
        input.parse::<Token![#]>()?;
        let content;
        syn::bracketed!(content in input);

        let key: Ident = content.parse()?;
        if key != "discr" {
            return Err(syn::Error::new(
                key.span(),
                "unknown attribute; only #[discr = \"...\"] is supported",
            ));
        }
        if tag.is_some() {
            return Err(syn::Error::new(
                key.span(),
                "a class may declare at most one discriminator tag",
            ));
        }

        content.parse::<Token![=]>()?;
        let value: syn::LitStr = content.parse()?;
        if value.value().is_empty() {
            return Err(syn::Error::new(
                value.span(),
                "discriminator tag must not be empty",
            ));
        }
        tag = Some(value.value());
    }

    Ok(tag)
}

// =============================================================================
// Tree analysis (runs at macro expansion time)
// =============================================================================

/// Flattened class with its parent edge, in declaration (discovery) order.
struct FlatClass {
    name: String,
    parent: Option<String>,
    tag: Option<String>,
}

fn flatten_nodes(nodes: &[Node], parent: Option<&str>, out: &mut Vec<FlatClass>) {
    for node in nodes {
        let name = node.name.to_string();
        out.push(FlatClass {
            name: name.clone(),
            parent: parent.map(str::to_string),
            tag: node.tag.clone(),
        });
        flatten_nodes(&node.children, Some(&name), out);
    }
}

// =============================================================================
// Crate path resolution
// =============================================================================

fn dm_crate_path() -> TokenStream2 {
    match crate_name("discr-map") {
        Ok(FoundCrate::Itself) => {
            quote!(::discr_map)
        }
        Ok(FoundCrate::Name(name)) => {
            let ident = Ident::new(&name, Span::call_site());
            quote!(::#ident)
        }
        Err(_) => quote!(::discr_map),
    }
}

// =============================================================================
// Code generation
// =============================================================================

/// Recursively generate class marker types using the module-based pattern.
///
/// Each class becomes a module containing `pub struct Class` plus
/// convenience consts; subclasses are nested modules inside the parent
/// module, so the Rust module tree mirrors the declared hierarchy.
fn generate_classes_recursive(nodes: &[Node], dm_crate: &TokenStream2) -> Vec<TokenStream2> {
    let mut output = Vec::new();

    for node in nodes {
        let node_ident = &node.name;
        let name = node.name.to_string();
        let name_lit = syn::LitStr::new(&name, Span::call_site());
        let name_bytes = syn::LitByteStr::new(name.as_bytes(), Span::call_site());

        let tag_tokens = match &node.tag {
            Some(tag) => {
                let tag_lit = syn::LitStr::new(tag, Span::call_site());
                quote!(Some(#tag_lit))
            }
            None => quote!(None),
        };

        let children_output = generate_classes_recursive(&node.children, dm_crate);

        output.push(quote! {
            #[allow(non_snake_case)]
            pub mod #node_ident {
                use super::*;

                /// Zero-sized marker type for this entity class.
                #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
                pub struct Class;

                impl Class {
                    /// Class name, globally unique across hierarchies.
                    pub const NAME: &'static str = #name_lit;

                    /// Stable class identity, computed at compile time.
                    pub const ID: #dm_crate::ClassId = #dm_crate::class_id(#name_bytes);

                    /// Declared discriminator tag, if any.
                    pub const TAG: Option<&'static str> = #tag_tokens;
                }

                impl core::fmt::Display for Class {
                    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                        f.write_str(Self::NAME)
                    }
                }

                impl #dm_crate::EntityClass for Class {
                    const NAME: &'static str = Class::NAME;
                    const ID: #dm_crate::ClassId = Class::ID;
                    const TAG: Option<&'static str> = Class::TAG;
                }

                // Module-level convenience constants
                pub const ID: #dm_crate::ClassId = Class::ID;
                pub const NAME: &'static str = Class::NAME;
                pub const TAG: Option<&'static str> = Class::TAG;

                // Nested subclass modules
                #(#children_output)*
            }
        });
    }

    output
}

/// Generate the flat `ClassDef` table entries in declaration order.
fn collect_defs(
    nodes: &[Node],
    parent: Option<&str>,
    dm_crate: &TokenStream2,
    out: &mut Vec<TokenStream2>,
) {
    for node in nodes {
        let name = node.name.to_string();
        let name_lit = syn::LitStr::new(&name, Span::call_site());

        let parent_tokens = match parent {
            Some(p) => {
                let parent_lit = syn::LitStr::new(p, Span::call_site());
                quote!(Some(#parent_lit))
            }
            None => quote!(None),
        };

        let tag_tokens = match &node.tag {
            Some(tag) => {
                let tag_lit = syn::LitStr::new(tag, Span::call_site());
                quote!(Some(#tag_lit))
            }
            None => quote!(None),
        };

        out.push(quote! {
            #dm_crate::ClassDef {
                name: #name_lit,
                parent: #parent_tokens,
                tag: #tag_tokens,
            },
        });

        collect_defs(&node.children, Some(&name), dm_crate, out);
    }
}

/// Generate compile-time id-collision detection with specific error messages.
fn generate_collision_check(flat: &[FlatClass], dm_crate: &TokenStream2) -> TokenStream2 {
    let mut checks = Vec::new();

    for i in 0..flat.len() {
        for j in (i + 1)..flat.len() {
            let bytes_a = syn::LitByteStr::new(flat[i].name.as_bytes(), Span::call_site());
            let bytes_b = syn::LitByteStr::new(flat[j].name.as_bytes(), Span::call_site());

            let error_msg = format!(
                "class id collision: '{}' and '{}' hash to the same value",
                flat[i].name, flat[j].name
            );

            checks.push(quote! {
                const _: () = {
                    const ID_A: #dm_crate::ClassId = #dm_crate::class_id(#bytes_a);
                    const ID_B: #dm_crate::ClassId = #dm_crate::class_id(#bytes_b);
                    assert!(ID_A != ID_B, #error_msg);
                };
            });
        }
    }

    quote! {
        #(#checks)*
    }
}

// =============================================================================
// Entry point
// =============================================================================

#[proc_macro]
pub fn entity_hierarchy(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as HierarchyInput);
    let dm_crate = dm_crate_path();

    // 1. Flatten and validate names
    let mut flat = Vec::new();
    flatten_nodes(&input.nodes, None, &mut flat);

    let mut seen = std::collections::HashSet::new();
    for class in &flat {
        if !seen.insert(class.name.as_str()) {
            panic!(
                "duplicate class name '{}': class names are global identities",
                class.name
            );
        }
    }

    let class_count = flat.len();

    // 2. Generate marker types
    let classes = generate_classes_recursive(&input.nodes, &dm_crate);

    // 3. Generate the ClassDef table
    let mut defs = Vec::new();
    collect_defs(&input.nodes, None, &dm_crate, &mut defs);

    // 4. Generate collision detection
    let collision_check = generate_collision_check(&flat, &dm_crate);

    // 5. Assemble
    let vis = input.vis;
    let root = input.root;

    let expanded = quote! {
        #[allow(non_snake_case, non_camel_case_types)]
        #vis mod #root {
            /// Total number of declared classes.
            pub const CLASS_COUNT: usize = #class_count;

            /// Flat ClassDef table (for building the runtime graph).
            pub const DEFINITIONS: &'static [#dm_crate::ClassDef] = &[
                #(#defs)*
            ];

            #collision_check

            #(#classes)*
        }
    };

    expanded.into()
}
