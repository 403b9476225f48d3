use iron::prelude::*;
use iron::middleware::Handler;
use iron::AfterMiddleware;

use options::{CacheControlOptions, ResolvedOptions};

/// Patches the `Cache-Control` header of every response the handler returns.
/// Errors go through untouched.
#[derive(Debug, Clone)]
pub struct ApplyCacheControl {
    options: ResolvedOptions,
}

impl ApplyCacheControl {
    pub fn new(options: ResolvedOptions) -> ApplyCacheControl {
        ApplyCacheControl {
            options: options,
        }
    }

    pub fn options(&self) -> &ResolvedOptions {
        &self.options
    }
}

impl AfterMiddleware for ApplyCacheControl {
    fn after(&self, req: &mut Request, mut res: Response) -> IronResult<Response> {
        trace!("Applying Cache-Control ({}) to {}", self.options, req.url);
        self.options.apply_to(&mut res);
        Ok(res)
    }
}

/// A handler ready to be served, decorated only when it has
/// cache-control directives to apply.
pub enum EntryPoint<H> {
    Plain(H),
    Decorated(Chain),
}

impl<H> EntryPoint<H> {
    pub fn is_decorated(&self) -> bool {
        match *self {
            EntryPoint::Plain(_) => false,
            EntryPoint::Decorated(_) => true,
        }
    }

    /// The original handler, if it was not wrapped.
    pub fn into_plain(self) -> Option<H> {
        match self {
            EntryPoint::Plain(handler) => Some(handler),
            EntryPoint::Decorated(_) => None,
        }
    }
}

impl<H: Handler> Handler for EntryPoint<H> {
    fn handle(&self, req: &mut Request) -> IronResult<Response> {
        match *self {
            EntryPoint::Plain(ref handler) => handler.handle(req),
            EntryPoint::Decorated(ref chain) => chain.handle(req),
        }
    }
}

/// Builds the base handler and wraps it with the configured
/// `Cache-Control` directives. With nothing configured the base handler
/// is returned as-is.
pub fn build_entry_point<H, F>(config: &CacheControlOptions, build_base: F) -> EntryPoint<H>
    where H: Handler,
          F: FnOnce() -> H,
{
    decorate(config, build_base())
}

/// Like `build_entry_point`, for base constructors that can fail. Their
/// error is returned untouched.
pub fn try_build_entry_point<H, F, E>(config: &CacheControlOptions, build_base: F) -> Result<EntryPoint<H>, E>
    where H: Handler,
          F: FnOnce() -> Result<H, E>,
{
    let handler = try!(build_base());
    Ok(decorate(config, handler))
}

fn decorate<H>(config: &CacheControlOptions, handler: H) -> EntryPoint<H>
    where H: Handler
{
    let options = config.collect();

    if options.is_empty() {
        trace!("No Cache-Control directives configured");
        return EntryPoint::Plain(handler);
    }

    debug!("Serving with Cache-Control: {}", options);
    let mut chain = Chain::new(handler);
    chain.link_after(ApplyCacheControl::new(options));
    EntryPoint::Decorated(chain)
}
