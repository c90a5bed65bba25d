use crate::Error;
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt::{self, Debug, Formatter};

lazy_static! {
    // `:name`, `:name?` or a bare `*`.
    static ref TOKEN_RE: Regex = Regex::new(r":([A-Za-z0-9_]+)(\?)?|\*").unwrap();
}

const PARAM_GROUP: &str = "([^/]+?)";
const WILDCARD_GROUP: &str = "(.*)";
const REST_GROUP_NAME: &str = "rest";

/// A named (or wildcard) capture of a route path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Key {
    /// The parameter name. Wildcards are named after their position among the wildcards: `"0"`, `"1"`, ...
    pub(crate) name: String,
    /// `true` for `:name?` parameters.
    pub(crate) optional: bool,
    /// `true` for `*`.
    pub(crate) wildcard: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PatternOptions {
    /// Match the path and all of its descendants instead of the exact path.
    pub(crate) prefix: bool,
    pub(crate) case_sensitive: bool,
    /// Don't tolerate a trailing slash on exact matches.
    pub(crate) strict: bool,
}

enum Matcher {
    // `/` mounted as a prefix matches everything and consumes nothing.
    Slash,
    // `*` as an exact route captures the whole path.
    Star,
    Regex(Regex),
}

/// A compiled route path.
pub(crate) struct Pattern {
    raw: String,
    keys: Vec<Key>,
    matcher: Matcher,
    prefix: bool,
}

/// The outcome of a successful [`Pattern::find`].
#[derive(Debug)]
pub(crate) struct PatternMatch<'a> {
    /// Raw (still percent-encoded) captures in declaration order. Optional keys which didn't participate are absent.
    pub(crate) captures: Vec<(&'a Key, &'a str)>,
    /// Length of the path portion consumed by a prefix pattern. Always `0` for exact patterns.
    pub(crate) prefix_len: usize,
}

impl Pattern {
    pub(crate) fn compile(path: &str, opts: PatternOptions) -> crate::Result<Pattern> {
        if opts.prefix && (path.is_empty() || path == "/") {
            return Ok(Pattern {
                raw: path.to_owned(),
                keys: Vec::new(),
                matcher: Matcher::Slash,
                prefix: true,
            });
        }

        if !opts.prefix && path == "*" {
            return Ok(Pattern {
                raw: path.to_owned(),
                keys: vec![Key {
                    name: String::from("0"),
                    optional: false,
                    wildcard: true,
                }],
                matcher: Matcher::Star,
                prefix: false,
            });
        }

        if !path.starts_with('/') {
            return Err(Error::new(format!("The route path must start with '/': {:?}", path)));
        }

        let source = if opts.prefix {
            path.strip_suffix('/').unwrap_or(path)
        } else {
            path
        };

        let (body, keys) = generate_body(source)?;

        let mut re_str = String::with_capacity(body.len() + 24);
        if !opts.case_sensitive {
            re_str.push_str("(?i)");
        }
        re_str.push('^');
        re_str.push_str(&body);

        if opts.prefix {
            re_str.push_str(&format!("(?P<{}>/.*)?$", REST_GROUP_NAME));
        } else if opts.strict {
            re_str.push('$');
        } else if body.ends_with('/') {
            re_str.push_str("?$");
        } else {
            re_str.push_str("/?$");
        }

        let re = Regex::new(&re_str)
            .map_err(|e| Error::new(format!("Could not compile the route path {:?}: {}", path, e)))?;

        Ok(Pattern {
            raw: path.to_owned(),
            keys,
            matcher: Matcher::Regex(re),
            prefix: opts.prefix,
        })
    }

    pub(crate) fn raw(&self) -> &str {
        &self.raw
    }

    pub(crate) fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub(crate) fn find<'a>(&'a self, path: &'a str) -> Option<PatternMatch<'a>> {
        match self.matcher {
            Matcher::Slash => Some(PatternMatch {
                captures: Vec::new(),
                prefix_len: 0,
            }),
            Matcher::Star => Some(PatternMatch {
                captures: self.keys.iter().map(|key| (key, path)).collect(),
                prefix_len: 0,
            }),
            Matcher::Regex(ref re) => {
                let caps = re.captures(path)?;

                let captures = self
                    .keys
                    .iter()
                    .enumerate()
                    .filter_map(|(idx, key)| caps.get(idx + 1).map(|m| (key, m.as_str())))
                    .collect();

                let prefix_len = if self.prefix {
                    path.len() - caps.name(REST_GROUP_NAME).map_or(0, |m| m.as_str().len())
                } else {
                    0
                };

                Some(PatternMatch { captures, prefix_len })
            }
        }
    }
}

impl Debug for Pattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let re = match self.matcher {
            Matcher::Slash => "<any>",
            Matcher::Star => "<star>",
            Matcher::Regex(ref re) => re.as_str(),
        };
        write!(
            f,
            "{{ raw: {:?}, regex: {:?}, keys: {:?}, prefix: {} }}",
            self.raw, re, self.keys, self.prefix
        )
    }
}

fn generate_body(path: &str) -> crate::Result<(String, Vec<Key>)> {
    let mut body = String::with_capacity(path.len() * 2);
    let mut keys: Vec<Key> = Vec::new();
    let mut wildcards = 0_usize;
    let mut last = 0;

    for caps in TOKEN_RE.captures_iter(path) {
        let whole = match caps.get(0) {
            Some(m) => m,
            None => continue,
        };
        let literal = &path[last..whole.start()];
        last = whole.end();

        let key = match caps.get(1) {
            Some(name) => {
                let optional = caps.get(2).is_some();

                if optional && literal.ends_with('/') {
                    // The separator goes away together with the missing segment.
                    body.push_str(&regex::escape(&literal[..literal.len() - 1]));
                    body.push_str("(?:/");
                    body.push_str(PARAM_GROUP);
                    body.push_str(")?");
                } else {
                    body.push_str(&regex::escape(literal));
                    body.push_str(PARAM_GROUP);
                    if optional {
                        body.push('?');
                    }
                }

                Key {
                    name: name.as_str().to_owned(),
                    optional,
                    wildcard: false,
                }
            }
            None => {
                body.push_str(&regex::escape(literal));
                body.push_str(WILDCARD_GROUP);

                let key = Key {
                    name: wildcards.to_string(),
                    optional: false,
                    wildcard: true,
                };
                wildcards += 1;
                key
            }
        };

        if keys.iter().any(|k| k.name == key.name) {
            return Err(Error::new(format!(
                "Duplicate parameter name {:?} in the route path {:?}",
                key.name, path
            )));
        }
        keys.push(key);
    }

    body.push_str(&regex::escape(&path[last..]));

    Ok((body, keys))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exact(path: &str) -> Pattern {
        Pattern::compile(path, PatternOptions::default()).unwrap()
    }

    fn prefix(path: &str) -> Pattern {
        Pattern::compile(
            path,
            PatternOptions {
                prefix: true,
                ..PatternOptions::default()
            },
        )
        .unwrap()
    }

    fn captures(pattern: &Pattern, path: &str) -> Option<Vec<(String, String)>> {
        pattern.find(path).map(|m| {
            m.captures
                .into_iter()
                .map(|(k, v)| (k.name.clone(), v.to_owned()))
                .collect()
        })
    }

    #[test]
    fn exact_match_tolerates_one_trailing_slash() {
        let p = exact("/about");
        assert!(p.find("/about").is_some());
        assert!(p.find("/about/").is_some());
        assert!(p.find("/about//").is_none());
        assert!(p.find("/about/me").is_none());
        assert!(p.find("/abou").is_none());
    }

    #[test]
    fn strict_exact_match_rejects_trailing_slash() {
        let p = Pattern::compile(
            "/about",
            PatternOptions {
                strict: true,
                ..PatternOptions::default()
            },
        )
        .unwrap();
        assert!(p.find("/about").is_some());
        assert!(p.find("/about/").is_none());
    }

    #[test]
    fn prefix_match_stops_at_segment_boundary() {
        let p = prefix("/api");
        assert_eq!(p.find("/api").unwrap().prefix_len, 4);
        assert_eq!(p.find("/api/").unwrap().prefix_len, 4);
        assert_eq!(p.find("/api/users").unwrap().prefix_len, 4);
        assert!(p.find("/apiv2").is_none());
        assert!(p.find("/ap").is_none());
    }

    #[test]
    fn prefix_pattern_drops_trailing_slash() {
        let p = prefix("/api/");
        assert_eq!(p.find("/api").unwrap().prefix_len, 4);
        assert_eq!(p.find("/api/x").unwrap().prefix_len, 4);
    }

    #[test]
    fn root_prefix_matches_everything_without_consuming() {
        let p = prefix("/");
        for path in &["/", "/a", "/a/b/c", ""] {
            let m = p.find(path).unwrap();
            assert_eq!(m.prefix_len, 0);
            assert!(m.captures.is_empty());
        }
    }

    #[test]
    fn star_route_captures_the_whole_path() {
        let p = exact("*");
        assert_eq!(
            captures(&p, "/any/thing"),
            Some(vec![("0".to_owned(), "/any/thing".to_owned())])
        );
    }

    #[test]
    fn named_params_are_captured_in_order() {
        let p = exact("/users/:userName/books/:bookName");
        assert_eq!(
            captures(&p, "/users/alice/books/HarryPotter"),
            Some(vec![
                ("userName".to_owned(), "alice".to_owned()),
                ("bookName".to_owned(), "HarryPotter".to_owned()),
            ])
        );
        assert!(p.find("/users/alice/books").is_none());
        assert!(p.find("/users//books/x").is_none());
    }

    #[test]
    fn prefix_params_capture_only_their_segment() {
        let p = prefix("/users/:id");
        let m = p.find("/users/42/posts").unwrap();
        assert_eq!(m.prefix_len, "/users/42".len());
        assert_eq!(m.captures[0].1, "42");
    }

    #[test]
    fn optional_param_folds_its_separator() {
        let p = exact("/posts/:page?");
        assert_eq!(captures(&p, "/posts"), Some(vec![]));
        assert_eq!(captures(&p, "/posts/"), Some(vec![]));
        assert_eq!(
            captures(&p, "/posts/3"),
            Some(vec![("page".to_owned(), "3".to_owned())])
        );
        assert!(p.keys()[0].optional);
    }

    #[test]
    fn wildcards_are_numbered() {
        let p = exact("/files/*/raw/*");
        assert_eq!(
            captures(&p, "/files/a/b/raw/c.txt"),
            Some(vec![
                ("0".to_owned(), "a/b".to_owned()),
                ("1".to_owned(), "c.txt".to_owned()),
            ])
        );
        assert!(p.keys().iter().all(|k| k.wildcard));
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let p = exact("/file.json");
        assert!(p.find("/file.json").is_some());
        assert!(p.find("/fileXjson").is_none());

        let p = exact("/a+b/(c)");
        assert!(p.find("/a+b/(c)").is_some());
        assert!(p.find("/aab/c").is_none());
    }

    #[test]
    fn matching_is_case_insensitive_by_default() {
        assert!(exact("/About").find("/aBOUT").is_some());

        let p = Pattern::compile(
            "/About",
            PatternOptions {
                case_sensitive: true,
                ..PatternOptions::default()
            },
        )
        .unwrap();
        assert!(p.find("/About").is_some());
        assert!(p.find("/about").is_none());
    }

    #[test]
    fn duplicate_param_names_are_rejected() {
        assert!(Pattern::compile("/:id/x/:id", PatternOptions::default()).is_err());
    }

    #[test]
    fn relative_paths_are_rejected() {
        assert!(Pattern::compile("users", PatternOptions::default()).is_err());
    }
}
