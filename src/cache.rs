use std::{cmp, fmt};

use iron::headers::{CacheDirective, CacheControl};
use iron::modifier::Modifier;
use iron::modifiers::Header;
use iron::prelude::*;

use options::{Directive, DirectiveValue, ResolvedOptions};

impl ResolvedOptions {
    /// The header directives for a response that has none of its own.
    pub fn to_directives(&self) -> Vec<CacheDirective> {
        patch(Vec::new(), self)
    }

    /// Merges the options into any `Cache-Control` header the response
    /// already carries.
    pub fn apply_to(&self, response: &mut Response) {
        let existing = response.headers.get::<CacheControl>()
            .map(|header| header.0.clone())
            .unwrap_or_default();

        let directives = patch(existing, self);
        trace!("Patched Cache-Control to {:?}", directives);

        if directives.is_empty() {
            response.headers.remove::<CacheControl>();
        } else {
            Header(CacheControl(directives)).modify(response)
        }
    }
}

impl fmt::Display for ResolvedOptions {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&CacheControl(self.to_directives()), f)
    }
}

impl Modifier<Response> for ResolvedOptions {
    fn modify(self, response: &mut Response) {
        self.apply_to(response)
    }
}

fn patch(mut directives: Vec<CacheDirective>, options: &ResolvedOptions) -> Vec<CacheDirective> {
    let private = options.get(Directive::Private);

    // Public and private override whatever the response already had
    if options.contains(Directive::Public) {
        directives.retain(|d| directive_of(d) != Some(Directive::Private));
    } else if private.is_some() {
        directives.retain(|d| directive_of(d) != Some(Directive::Public));
    }

    for (directive, value) in options {
        let value = match (directive, value) {
            (Directive::MaxAge, DirectiveValue::Seconds(secs)) => {
                let shortest = directives.iter()
                    .filter_map(max_age_of)
                    .fold(secs, cmp::min);
                DirectiveValue::Seconds(shortest)
            }
            (Directive::Public, DirectiveValue::Flag(true)) if private == Some(DirectiveValue::Flag(true)) => {
                debug!("Both public and private requested, keeping private");
                DirectiveValue::Flag(false)
            }
            _ => value,
        };

        directives.retain(|d| directive_of(d) != Some(directive));
        directives.extend(to_cache_directive(directive, value));
    }

    directives
}

/// Directive names are case-insensitive; hyper only recognises the
/// lowercase spelling and keeps anything else as an extension.
fn directive_of(header: &CacheDirective) -> Option<Directive> {
    match *header {
        CacheDirective::Public => Some(Directive::Public),
        CacheDirective::Private => Some(Directive::Private),
        CacheDirective::NoCache => Some(Directive::NoCache),
        CacheDirective::NoTransform => Some(Directive::NoTransform),
        CacheDirective::MustRevalidate => Some(Directive::MustRevalidate),
        CacheDirective::ProxyRevalidate => Some(Directive::ProxyRevalidate),
        CacheDirective::MaxAge(_) => Some(Directive::MaxAge),
        CacheDirective::SMaxAge(_) => Some(Directive::SMaxAge),
        CacheDirective::Extension(ref name, _) => {
            Directive::ALL.iter().cloned().find(|d| name.eq_ignore_ascii_case(d.token()))
        }
        _ => None,
    }
}

fn max_age_of(header: &CacheDirective) -> Option<u32> {
    match *header {
        CacheDirective::MaxAge(secs) => Some(secs),
        CacheDirective::Extension(ref name, Some(ref secs)) if name.eq_ignore_ascii_case(Directive::MaxAge.token()) => {
            secs.trim_matches('"').parse().ok()
        }
        _ => None,
    }
}

/// `false` flags produce nothing; the directive is simply absent.
fn to_cache_directive(directive: Directive, value: DirectiveValue) -> Option<CacheDirective> {
    match value {
        DirectiveValue::Flag(false) => None,
        DirectiveValue::Flag(true) => match directive {
            Directive::Public => Some(CacheDirective::Public),
            Directive::Private => Some(CacheDirective::Private),
            Directive::NoCache => Some(CacheDirective::NoCache),
            Directive::NoTransform => Some(CacheDirective::NoTransform),
            Directive::MustRevalidate => Some(CacheDirective::MustRevalidate),
            Directive::ProxyRevalidate => Some(CacheDirective::ProxyRevalidate),
            Directive::MaxAge | Directive::SMaxAge => unreachable!("{} is not a flag", directive),
        },
        DirectiveValue::Seconds(secs) => match directive {
            Directive::MaxAge => Some(CacheDirective::MaxAge(secs)),
            Directive::SMaxAge => Some(CacheDirective::SMaxAge(secs)),
            _ => unreachable!("{} does not take seconds", directive),
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use iron::headers::CacheDirective::*;
    use options::CacheControlOptions;

    fn patched(existing: Vec<CacheDirective>, config: CacheControlOptions) -> Vec<CacheDirective> {
        let mut response = Response::new();
        if !existing.is_empty() {
            response.headers.set(CacheControl(existing));
        }
        config.collect().modify(&mut response);
        response.headers.get::<CacheControl>()
            .map(|header| header.0.clone())
            .unwrap_or_default()
    }

    fn patched_raw(existing: &str, config: CacheControlOptions) -> Vec<CacheDirective> {
        let mut response = Response::new();
        response.headers.set_raw("Cache-Control", vec![existing.as_bytes().to_vec()]);
        config.collect().modify(&mut response);
        response.headers.get::<CacheControl>()
            .map(|header| header.0.clone())
            .unwrap_or_default()
    }

    #[test]
    fn renders_in_canonical_order() {
        let options = CacheControlOptions::new().max_age(3600).private(true).collect();
        assert_eq!(options.to_directives(), vec![Private, MaxAge(3600)]);
        assert_eq!(options.to_string(), "private, max-age=3600");
    }

    #[test]
    fn renders_every_directive() {
        let options = CacheControlOptions {
            public: Some(true),
            private: None,
            no_cache: Some(true),
            no_transform: Some(true),
            must_revalidate: Some(true),
            proxy_revalidate: Some(true),
            max_age: Some(60),
            s_maxage: Some(120),
        }.collect();

        assert_eq!(
            options.to_string(),
            "public, no-cache, no-transform, must-revalidate, proxy-revalidate, max-age=60, s-maxage=120"
        );
    }

    #[test]
    fn false_flags_are_not_rendered() {
        let options = CacheControlOptions::new().public(false).collect();
        assert!(options.to_directives().is_empty());
    }

    #[test]
    fn sets_header_on_a_bare_response() {
        let directives = patched(vec![], CacheControlOptions::new().no_cache(true));
        assert_eq!(directives, vec![NoCache]);
    }

    #[test]
    fn keeps_the_shorter_existing_max_age() {
        let directives = patched(vec![MaxAge(60)], CacheControlOptions::new().max_age(3600));
        assert_eq!(directives, vec![MaxAge(60)]);
    }

    #[test]
    fn replaces_a_longer_existing_max_age() {
        let directives = patched(vec![MaxAge(86400)], CacheControlOptions::new().max_age(3600));
        assert_eq!(directives, vec![MaxAge(3600)]);
    }

    #[test]
    fn s_maxage_is_simply_replaced() {
        let directives = patched(vec![SMaxAge(10)], CacheControlOptions::new().s_maxage(600));
        assert_eq!(directives, vec![SMaxAge(600)]);
    }

    #[test]
    fn public_overrides_private() {
        let directives = patched(vec![Private, MaxAge(10)], CacheControlOptions::new().public(true));
        assert_eq!(directives, vec![MaxAge(10), Public]);
    }

    #[test]
    fn private_overrides_public() {
        let directives = patched(vec![Public], CacheControlOptions::new().private(true));
        assert_eq!(directives, vec![Private]);
    }

    #[test]
    fn explicit_false_removes_existing_directive() {
        let directives = patched(vec![NoTransform, MaxAge(5)], CacheControlOptions::new().no_transform(false));
        assert_eq!(directives, vec![MaxAge(5)]);
    }

    #[test]
    fn unrelated_directives_survive() {
        let existing = vec![NoStore, Extension("immutable".into(), None)];
        let directives = patched(existing, CacheControlOptions::new().max_age(30));
        assert_eq!(directives, vec![NoStore, Extension("immutable".into(), None), MaxAge(30)]);
    }

    #[test]
    fn emptied_header_is_removed() {
        let mut response = Response::new();
        response.headers.set(CacheControl(vec![Public]));
        CacheControlOptions::new().public(false).collect().modify(&mut response);
        assert!(response.headers.get::<CacheControl>().is_none());
    }

    #[test]
    fn private_overrides_capitalised_public() {
        let directives = patched_raw("Public", CacheControlOptions::new().private(true));
        assert_eq!(directives, vec![Private]);
    }

    #[test]
    fn public_overrides_capitalised_private() {
        let directives = patched_raw("PRIVATE, no-store", CacheControlOptions::new().public(true));
        assert_eq!(directives, vec![NoStore, Public]);
    }

    #[test]
    fn keeps_the_shorter_capitalised_max_age() {
        let directives = patched_raw("Max-Age=60", CacheControlOptions::new().max_age(3600));
        assert_eq!(directives, vec![MaxAge(60)]);
    }

    #[test]
    fn replaces_a_longer_capitalised_max_age() {
        let directives = patched_raw("MAX-AGE=86400", CacheControlOptions::new().max_age(3600));
        assert_eq!(directives, vec![MaxAge(3600)]);
    }

    #[test]
    fn capitalised_flags_are_replaced_not_duplicated() {
        let directives = patched_raw("No-Cache", CacheControlOptions::new().no_cache(true));
        assert_eq!(directives, vec![NoCache]);
    }

    #[test]
    fn private_wins_when_both_are_requested() {
        let both = CacheControlOptions::new().public(true).private(true);
        assert_eq!(patched(vec![Private], both), vec![Private]);
        assert_eq!(patched(vec![Public, MaxAge(5)], both), vec![MaxAge(5), Private]);
        assert_eq!(both.collect().to_string(), "private");
    }

    #[test]
    fn explicit_false_private_still_allows_public() {
        let config = CacheControlOptions::new().public(true).private(false);
        assert_eq!(patched(vec![Private], config), vec![Public]);
    }
}
