use std::collections::btree_map::{self, BTreeMap};
use std::time::Duration;
use std::{cmp, fmt};

use rustc_serialize::json;
use rustc_serialize::{Decodable, Decoder};

/// The `Cache-Control` directives a handler may declare.
///
/// Variants are declared in canonical order; `Ord` follows it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Directive {
    Public,
    Private,
    NoCache,
    NoTransform,
    MustRevalidate,
    ProxyRevalidate,
    MaxAge,
    SMaxAge,
}

impl Directive {
    pub const ALL: [Directive; 8] = [
        Directive::Public,
        Directive::Private,
        Directive::NoCache,
        Directive::NoTransform,
        Directive::MustRevalidate,
        Directive::ProxyRevalidate,
        Directive::MaxAge,
        Directive::SMaxAge,
    ];

    /// The option name, as used in configuration files.
    pub fn name(&self) -> &'static str {
        match *self {
            Directive::Public => "public",
            Directive::Private => "private",
            Directive::NoCache => "no_cache",
            Directive::NoTransform => "no_transform",
            Directive::MustRevalidate => "must_revalidate",
            Directive::ProxyRevalidate => "proxy_revalidate",
            Directive::MaxAge => "max_age",
            Directive::SMaxAge => "s_maxage",
        }
    }

    /// The token written into the header.
    pub fn token(&self) -> &'static str {
        match *self {
            Directive::Public => "public",
            Directive::Private => "private",
            Directive::NoCache => "no-cache",
            Directive::NoTransform => "no-transform",
            Directive::MustRevalidate => "must-revalidate",
            Directive::ProxyRevalidate => "proxy-revalidate",
            Directive::MaxAge => "max-age",
            Directive::SMaxAge => "s-maxage",
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DirectiveValue {
    Flag(bool),
    Seconds(u32),
}

impl fmt::Display for DirectiveValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DirectiveValue::Flag(flag) => write!(f, "{}", flag),
            DirectiveValue::Seconds(secs) => write!(f, "{}", secs),
        }
    }
}

/// Declarative cache-control settings for a handler.
///
/// `None` means the directive was never configured and is left alone.
/// `Some(false)` and `Some(0)` are explicit settings and are passed on.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct CacheControlOptions {
    pub public: Option<bool>,
    pub private: Option<bool>,
    pub no_cache: Option<bool>,
    pub no_transform: Option<bool>,
    pub must_revalidate: Option<bool>,
    pub proxy_revalidate: Option<bool>,
    pub max_age: Option<u32>,
    pub s_maxage: Option<u32>,
}

impl CacheControlOptions {
    pub fn new() -> CacheControlOptions {
        CacheControlOptions::default()
    }

    /// `public, max-age=<duration>`, the usual policy for static assets.
    pub fn public_for(duration: Duration) -> CacheControlOptions {
        CacheControlOptions::new()
            .public(true)
            .max_age_duration(duration)
    }

    /// Reads settings from a JSON object such as
    /// `{"private": true, "max_age": 3600}`. Missing or `null` keys are
    /// left unset.
    pub fn from_json(s: &str) -> json::DecodeResult<CacheControlOptions> {
        json::decode(s)
    }

    pub fn public(mut self, value: bool) -> Self {
        self.public = Some(value);
        self
    }

    pub fn private(mut self, value: bool) -> Self {
        self.private = Some(value);
        self
    }

    pub fn no_cache(mut self, value: bool) -> Self {
        self.no_cache = Some(value);
        self
    }

    pub fn no_transform(mut self, value: bool) -> Self {
        self.no_transform = Some(value);
        self
    }

    pub fn must_revalidate(mut self, value: bool) -> Self {
        self.must_revalidate = Some(value);
        self
    }

    pub fn proxy_revalidate(mut self, value: bool) -> Self {
        self.proxy_revalidate = Some(value);
        self
    }

    pub fn max_age(mut self, seconds: u32) -> Self {
        self.max_age = Some(seconds);
        self
    }

    pub fn s_maxage(mut self, seconds: u32) -> Self {
        self.s_maxage = Some(seconds);
        self
    }

    pub fn max_age_duration(self, duration: Duration) -> Self {
        self.max_age(capped_seconds(duration))
    }

    pub fn s_maxage_duration(self, duration: Duration) -> Self {
        self.s_maxage(capped_seconds(duration))
    }

    /// The configured value of a single directive.
    pub fn get(&self, directive: Directive) -> Option<DirectiveValue> {
        let flag = |value: Option<bool>| value.map(DirectiveValue::Flag);
        let seconds = |value: Option<u32>| value.map(DirectiveValue::Seconds);

        match directive {
            Directive::Public => flag(self.public),
            Directive::Private => flag(self.private),
            Directive::NoCache => flag(self.no_cache),
            Directive::NoTransform => flag(self.no_transform),
            Directive::MustRevalidate => flag(self.must_revalidate),
            Directive::ProxyRevalidate => flag(self.proxy_revalidate),
            Directive::MaxAge => seconds(self.max_age),
            Directive::SMaxAge => seconds(self.s_maxage),
        }
    }

    /// Gathers every directive that was explicitly set.
    pub fn collect(&self) -> ResolvedOptions {
        let mut options = ResolvedOptions::default();

        for &directive in Directive::ALL.iter() {
            if let Some(value) = self.get(directive) {
                options.insert(directive, value);
            }
        }

        options
    }
}

fn capped_seconds(duration: Duration) -> u32 {
    // The header carries ages as u32 seconds; longer durations saturate
    cmp::min(duration.as_secs(), u32::MAX as u64) as u32
}

impl Decodable for CacheControlOptions {
    fn decode<D: Decoder>(d: &mut D) -> Result<CacheControlOptions, D::Error> {
        d.read_struct("CacheControlOptions", 8, |d| {
            Ok(CacheControlOptions {
                public: try!(d.read_struct_field("public", 0, Decodable::decode)),
                private: try!(d.read_struct_field("private", 1, Decodable::decode)),
                no_cache: try!(d.read_struct_field("no_cache", 2, Decodable::decode)),
                no_transform: try!(d.read_struct_field("no_transform", 3, Decodable::decode)),
                must_revalidate: try!(d.read_struct_field("must_revalidate", 4, Decodable::decode)),
                proxy_revalidate: try!(d.read_struct_field("proxy_revalidate", 5, Decodable::decode)),
                max_age: try!(d.read_struct_field("max_age", 6, Decodable::decode)),
                s_maxage: try!(d.read_struct_field("s_maxage", 7, Decodable::decode)),
            })
        })
    }
}

/// The directives a handler explicitly configured, keyed by directive.
///
/// Built fresh by `CacheControlOptions::collect`; never holds an unset
/// directive.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResolvedOptions(BTreeMap<Directive, DirectiveValue>);

impl ResolvedOptions {
    fn insert(&mut self, directive: Directive, value: DirectiveValue) {
        self.0.insert(directive, value);
    }

    pub fn get(&self, directive: Directive) -> Option<DirectiveValue> {
        self.0.get(&directive).cloned()
    }

    pub fn contains(&self, directive: Directive) -> bool {
        self.0.contains_key(&directive)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates in canonical directive order.
    pub fn iter(&self) -> Iter {
        Iter(self.0.iter())
    }
}

pub struct Iter<'a>(btree_map::Iter<'a, Directive, DirectiveValue>);

impl<'a> Iterator for Iter<'a> {
    type Item = (Directive, DirectiveValue);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(&directive, &value)| (directive, value))
    }
}

impl<'a> IntoIterator for &'a ResolvedOptions {
    type Item = (Directive, DirectiveValue);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}
