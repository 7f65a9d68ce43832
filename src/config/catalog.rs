//! Compiled page catalog
//!
//! [`Catalog::compile`] turns the config file's page definitions into
//! immutable [`Page`]s: key specifiers are parsed into [`KeyBind`]s,
//! templates are checked for well-formed placeholders, and every key
//! destination is checked against the page it leads to.

use crate::config::settings::{PageDef, Settings};
use crate::db::bind::check_arity;
use crate::error::{ConfigError, ConfigResult};
use crate::keymap::KeyBind;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// What a page key binding does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Go to the destination built from `target` and the highlighted row
    Goto { target: String },
    /// Pick a destination by the highlighted row's first column
    Switch { table: HashMap<String, String> },
}

/// Statement kinds a page can run besides its select
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Insert,
    Update,
    Delete,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StatementKind::Insert => "insert",
            StatementKind::Update => "update",
            StatementKind::Delete => "delete",
        })
    }
}

/// A configured page, read-only after load
#[derive(Debug, Clone)]
pub struct Page {
    pub name: String,
    pub select: Option<String>,
    pub insert: Option<String>,
    pub update: Option<String>,
    pub delete: Option<String>,
    pub bindings: HashMap<KeyBind, Transition>,
}

impl Page {
    /// Template for a statement kind
    pub fn template(&self, kind: StatementKind) -> Option<&str> {
        match kind {
            StatementKind::Insert => self.insert.as_deref(),
            StatementKind::Update => self.update.as_deref(),
            StatementKind::Delete => self.delete.as_deref(),
        }
    }

    /// Bindings as `(key, description)` pairs, sorted by key
    pub fn binding_descriptions(&self) -> Vec<(String, String)> {
        let mut list: Vec<(String, String)> = self
            .bindings
            .iter()
            .map(|(key, transition)| {
                let what = match transition {
                    Transition::Goto { target } => format!("go to {}", target),
                    Transition::Switch { table } => {
                        let mut ids: Vec<&str> = table.keys().map(String::as_str).collect();
                        ids.sort_unstable();
                        format!("switch on first column ({})", ids.join(", "))
                    }
                };
                (key.to_string(), what)
            })
            .collect();
        list.sort();
        list
    }
}

/// All pages plus the default page name
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pages: HashMap<String, Page>,
    default: Option<String>,
}

impl Catalog {
    /// Compile and validate the page definitions in `settings`.
    pub fn compile(settings: &Settings) -> ConfigResult<Self> {
        let defs = &settings.pages;

        if let Some(default) = &settings.default
            && !defs.contains_key(default)
        {
            return Err(ConfigError::PageNotFound(default.clone()));
        }

        let mut pages = HashMap::with_capacity(defs.len());
        for (name, def) in defs {
            pages.insert(name.clone(), compile_page(name, def, defs)?);
        }

        tracing::debug!(pages = pages.len(), "page catalog compiled");
        Ok(Self {
            pages,
            default: settings.default.clone(),
        })
    }

    /// Look up a page by name
    pub fn page(&self, name: &str) -> ConfigResult<&Page> {
        self.pages
            .get(name)
            .ok_or_else(|| ConfigError::PageNotFound(name.to_string()))
    }

    /// Look up a page that can become active, returning it with its select
    pub fn active_page(&self, name: &str) -> ConfigResult<(&Page, &str)> {
        let page = self.page(name)?;
        let select = page
            .select
            .as_deref()
            .ok_or_else(|| ConfigError::NoSelect(name.to_string()))?;
        Ok((page, select))
    }

    pub fn default_page(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Check that `page` can be opened with `args` arguments
    pub fn check_invocation(&self, page: &str, args: usize) -> ConfigResult<()> {
        let (_, select) = self.active_page(page)?;
        check_arity(select, args).map_err(|source| ConfigError::Template {
            page: page.to_string(),
            context: format!("select with {} argument(s)", args),
            source,
        })
    }

    /// Page names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.pages.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

fn compile_page(name: &str, def: &PageDef, defs: &BTreeMap<String, PageDef>) -> ConfigResult<Page> {
    let templates = [
        ("select", &def.select),
        ("insert", &def.insert),
        ("update", &def.update),
        ("delete", &def.delete),
    ];
    for (context, template) in templates {
        if let Some(template) = template {
            check_arity(template, usize::MAX).map_err(|source| ConfigError::Template {
                page: name.to_string(),
                context: context.to_string(),
                source,
            })?;
        }
    }

    let mut bindings = HashMap::new();

    for (spec, target) in &def.keys {
        let key = parse_key(name, spec)?;
        check_destination(name, spec, target, defs)?;
        bindings.insert(
            key,
            Transition::Goto {
                target: target.clone(),
            },
        );
    }

    for (spec, switch) in &def.switch_keys {
        let key = parse_key(name, spec)?;
        if bindings.contains_key(&key) {
            tracing::warn!(
                page = name,
                key = %spec,
                "key is bound both as a key and a switch-key; keeping the key binding"
            );
            continue;
        }
        let mut table = HashMap::with_capacity(switch.len());
        for (value, target) in switch {
            if target.trim().is_empty() {
                continue;
            }
            check_destination(name, spec, target, defs)?;
            table.insert(value.clone(), target.clone());
        }
        bindings.insert(key, Transition::Switch { table });
    }

    Ok(Page {
        name: name.to_string(),
        select: def.select.clone(),
        insert: def.insert.clone(),
        update: def.update.clone(),
        delete: def.delete.clone(),
        bindings,
    })
}

fn parse_key(page: &str, spec: &str) -> ConfigResult<KeyBind> {
    KeyBind::parse(spec).ok_or_else(|| ConfigError::InvalidKey {
        page: page.to_string(),
        key: spec.to_string(),
    })
}

/// Validate one key destination (`page arg...`) of page `from`.
fn check_destination(
    from: &str,
    key: &str,
    target: &str,
    defs: &BTreeMap<String, PageDef>,
) -> ConfigResult<()> {
    let context = format!("key '{}' -> '{}'", key, target);

    check_arity(target, usize::MAX).map_err(|source| ConfigError::Template {
        page: from.to_string(),
        context: context.clone(),
        source,
    })?;

    let mut tokens = target.split_whitespace();
    let dest = tokens.next().ok_or_else(|| {
        ConfigError::Invalid(format!("page '{}', {}: empty destination", from, context))
    })?;
    if dest.contains('$') {
        return Err(ConfigError::Invalid(format!(
            "page '{}', {}: destination page name must be literal",
            from, context
        )));
    }

    let def = defs
        .get(dest)
        .ok_or_else(|| ConfigError::PageNotFound(dest.to_string()))?;
    let select = def
        .select
        .as_deref()
        .ok_or_else(|| ConfigError::NoSelect(dest.to_string()))?;

    check_arity(select, tokens.count()).map_err(|source| ConfigError::Template {
        page: dest.to_string(),
        context: format!("select reached from page '{}' {}", from, context),
        source,
    })
}
