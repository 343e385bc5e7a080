mod route;

use proc_macro::TokenStream;

/// Documents a handler for the OpenAPI router.
///
/// Emits `<handler>_docs`, a transform taking its summary from the first line
/// of the handler's doc comment and its description from the rest, plus every
/// `tag = ..` and `response(status = .., shape = .., description = ..)` given.
#[proc_macro_attribute]
pub fn route(args: TokenStream, input: TokenStream) -> TokenStream {
	route::expand(args.into(), input.into())
		.unwrap_or_else(|error| error)
		.into()
}
