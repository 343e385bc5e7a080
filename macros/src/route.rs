use darling::{ast::NestedMeta, FromMeta};
use proc_macro2::TokenStream;
use quote::{format_ident, quote, ToTokens};

#[derive(FromMeta)]
struct RouteArgs {
	#[darling(multiple)]
	tag: Vec<syn::Expr>,
	#[darling(multiple)]
	response: Vec<ResponseArgs>,
}

#[derive(FromMeta)]
struct ResponseArgs {
	status: syn::LitInt,
	shape: Option<syn::Type>,
	description: Option<String>,
}

/// Summary and optional description taken from a doc comment.
#[derive(Debug, PartialEq, Eq)]
struct Docs {
	summary: String,
	description: Option<String>,
}

pub fn expand(args: TokenStream, input: TokenStream) -> Result<TokenStream, TokenStream> {
	let args = NestedMeta::parse_meta_list(args).map_err(|e| e.into_compile_error())?;
	let args = RouteArgs::from_list(&args).map_err(|e| e.write_errors())?;
	let function = syn::parse2::<syn::ItemFn>(input).map_err(|e| e.into_compile_error())?;

	let Some(docs) = docs(&function.attrs) else {
		return Err(syn::Error::new_spanned(
			&function.sig.ident,
			"a documented route needs a doc comment; its first line is the summary",
		)
		.into_compile_error());
	};

	let name = format_ident!("{}_docs", function.sig.ident);
	let vis = &function.vis;
	let summary = docs.summary;
	let description = docs
		.description
		.map(|description| quote!(.description(#description)));
	let tags = args.tag.iter();
	let responses = args.response.into_iter().map(response);

	Ok(quote! {
		#function

		#vis fn #name(
			op: aide::transform::TransformOperation,
		) -> aide::transform::TransformOperation {
			op.summary(#summary)
				#description
				#(.tag(#tags))*
				#(#responses)*
		}
	})
}

fn response(response: ResponseArgs) -> TokenStream {
	let status = response.status;
	let shape = response
		.shape
		.map_or_else(|| quote!(()), |shape| shape.into_token_stream());

	match response.description {
		Some(description) => quote! {
			.response_with::<#status, #shape, _>(|res| res.description(#description))
		},
		None => quote!(.response::<#status, #shape>()),
	}
}

/// Reads `///` lines the way rustdoc does: trimmed, with a trailing `\`
/// joining a line to the next.
fn docs(attrs: &[syn::Attribute]) -> Option<Docs> {
	let mut text = String::new();

	for attr in attrs {
		let syn::Meta::NameValue(meta) = &attr.meta else {
			continue;
		};

		if !meta.path.is_ident("doc") {
			continue;
		}

		if let syn::Expr::Lit(syn::ExprLit {
			lit: syn::Lit::Str(line),
			..
		}) = &meta.value
		{
			text += line.value().trim();
			text += "\n";
		}
	}

	let text = text.trim().replace("\\\n", "");
	let mut parts = text.splitn(2, '\n');
	let summary = parts.next().filter(|summary| !summary.is_empty())?;
	let description = parts
		.next()
		.map(str::trim)
		.filter(|description| !description.is_empty());

	Some(Docs {
		summary: summary.to_owned(),
		description: description.map(str::to_owned),
	})
}
