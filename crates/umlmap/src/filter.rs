//! Search-driven visibility.
//!
//! [`SearchContext`] holds the current search string for one loaded model and
//! answers, per node, whether the node should be shown. A node is visible when
//! it matches a search token itself or when visibility propagates to it
//! through members, named association ends, its supertype chain, its subtypes
//! or, for packages, any contained class.
//!
//! Results are cached for the current search string only; changing the search
//! drops the cache.

use std::{
    cell::{Cell, RefCell},
    collections::{HashMap, HashSet},
};

use log::{trace, warn};
use regex::RegexBuilder;

use umlmap_core::{
    identifier::XmiId,
    semantic::{Attribute, Classification, Entity, Model, ModelError, Package},
};

/// Memoized state of one node for the current search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visibility {
    /// Evaluation is on the stack at this depth; reaching it again means a
    /// supertype cycle.
    Pending(usize),
    Resolved(bool),
}

/// The search string and its per-node visibility cache.
///
/// # Examples
///
/// ```
/// # use umlmap::filter::SearchContext;
/// let mut ctx = SearchContext::new("Foo bar");
/// assert!(ctx.matches("FooBar"));
/// assert!(ctx.matches("crowbar"));
/// assert!(!ctx.matches("baz"));
///
/// assert!(ctx.set_search(""));
/// assert!(ctx.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct SearchContext {
    search: String,
    tokens: Vec<String>,
    cache: RefCell<HashMap<XmiId, Visibility>>,
    /// Number of classes currently being evaluated.
    depth: Cell<usize>,
    /// Shallowest pending entry read by the evaluation in progress.
    low: Cell<usize>,
}

impl SearchContext {
    pub fn new(search: &str) -> Self {
        Self {
            search: search.to_string(),
            tokens: tokenize(search),
            ..Self::default()
        }
    }

    /// The raw search string.
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Returns `true` when no search is active and every node is visible.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Replaces the search string, returning whether it changed.
    ///
    /// Cached results are discarded when it did.
    pub fn set_search(&mut self, search: &str) -> bool {
        if self.search == search {
            return false;
        }
        trace!(search = search; "Search changed");
        self.search = search.to_string();
        self.tokens = tokenize(search);
        self.cache.get_mut().clear();
        true
    }

    /// Drops every cached result, e.g. when the model is replaced.
    pub fn reset(&mut self) {
        self.cache.get_mut().clear();
    }

    /// Returns `true` if `text` contains any search token, ignoring case.
    pub fn matches(&self, text: &str) -> bool {
        if self.tokens.is_empty() || text.is_empty() {
            return false;
        }
        let text = text.to_lowercase();
        self.tokens.iter().any(|token| text.contains(token.as_str()))
    }

    /// Returns `true` if a member attribute matches by name or declared type.
    pub fn is_member_visible(&self, member: &Attribute) -> bool {
        self.matches(member.name()) || member.type_name().is_some_and(|t| self.matches(t))
    }

    /// Decides whether the node `id` is visible under the current search.
    ///
    /// Unknown ids and non-node entities are not visible unless the search is
    /// empty.
    ///
    /// # Errors
    ///
    /// [`ModelError::MultipleSupertypes`] if visibility has to follow the
    /// supertype of a class that declares more than one.
    pub fn is_visible(&self, model: &Model, id: XmiId) -> Result<bool, ModelError> {
        if self.is_empty() {
            return Ok(true);
        }
        match model.entity(id) {
            Some(Entity::Stereotype(package) | Entity::Package(package)) => {
                self.is_package_visible(model, package)
            }
            Some(Entity::Classification(class)) => self.is_class_visible(model, class),
            _ => Ok(false),
        }
    }

    /// Visible nodes below `from_ancestor`, in diagram order.
    pub fn visible_nodes(
        &self,
        model: &Model,
        from_ancestor: Option<XmiId>,
    ) -> Result<Vec<XmiId>, ModelError> {
        let mut visible = Vec::new();
        for &id in model.get_nodes(from_ancestor).iter() {
            if self.is_visible(model, id)? {
                visible.push(id);
            }
        }
        Ok(visible)
    }

    /// Wraps every match of the search in `text` with a highlight span.
    pub fn highlight(&self, text: &str) -> String {
        highlight(text, &self.search)
    }

    fn is_package_visible(&self, model: &Model, package: &Package) -> Result<bool, ModelError> {
        if let Some(visible) = self.cached(package.xmi_id()) {
            return Ok(visible);
        }
        let mut visible = self.matches(package.name());
        if !visible {
            for class in model.all_classes(package) {
                if self.is_class_visible(model, class)? {
                    visible = true;
                    break;
                }
            }
        }
        self.store(package.xmi_id(), visible);
        Ok(visible)
    }

    fn is_class_visible(&self, model: &Model, class: &Classification) -> Result<bool, ModelError> {
        let id = class.xmi_id();
        let state = self.cache.borrow().get(&id).copied();
        match state {
            Some(Visibility::Resolved(visible)) => return Ok(visible),
            Some(Visibility::Pending(depth)) => {
                self.low.set(self.low.get().min(depth));
                return Ok(false);
            }
            None => {}
        }

        let depth = self.depth.replace(self.depth.get() + 1);
        let outer_low = self.low.replace(usize::MAX);
        self.cache.borrow_mut().insert(id, Visibility::Pending(depth));

        let visible = self.evaluate_class(model, class);

        let low = self.low.get();
        self.depth.set(depth);
        self.low.set(outer_low.min(low));
        // A result that read a pending caller is only valid for this walk.
        match visible {
            Ok(visible) if low >= depth => self.store(id, visible),
            _ => {
                self.cache.borrow_mut().remove(&id);
            }
        }
        visible
    }

    fn evaluate_class(&self, model: &Model, class: &Classification) -> Result<bool, ModelError> {
        if self.matches(class.name()) {
            return Ok(true);
        }
        if model
            .members(class)
            .into_iter()
            .any(|member| self.is_member_visible(member))
        {
            return Ok(true);
        }
        if self.matches(class.class_type().as_str())
            || self.matches(class.class_type().description())
        {
            return Ok(true);
        }
        let id = class.xmi_id();
        let via_association = model.associations_of(class).into_iter().any(|association| {
            association.end_for(id).is_some_and(|end| {
                end.role().name().is_some_and(|role| self.matches(role))
                    && end.class().is_some_and(|far| model.classification(far).is_some())
            })
        });
        if via_association {
            return Ok(true);
        }
        if let Some(super_type) = model.super_type(class)? {
            if self.is_class_visible(model, super_type)? {
                return Ok(true);
            }
        }
        Ok(model
            .sub_types(class)
            .into_iter()
            .any(|sub| self.matches(sub.name())))
    }

    fn cached(&self, id: XmiId) -> Option<bool> {
        match self.cache.borrow().get(&id) {
            Some(Visibility::Resolved(visible)) => Some(*visible),
            _ => None,
        }
    }

    fn store(&self, id: XmiId, visible: bool) {
        self.cache
            .borrow_mut()
            .insert(id, Visibility::Resolved(visible));
    }
}

fn tokenize(search: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    search
        .split_whitespace()
        .map(str::to_lowercase)
        .filter(|token| seen.insert(token.clone()))
        .collect()
}

/// Wraps every case-insensitive occurrence of any token of `search` in
/// `<span class="highlight">`.
///
/// An empty search returns the text unchanged.
///
/// # Examples
///
/// ```
/// # use umlmap::filter::highlight;
/// assert_eq!(
///     highlight("Person og personalia", "person"),
///     r#"<span class="highlight">Person</span> og <span class="highlight">person</span>alia"#
/// );
/// assert_eq!(highlight("a+b", "+"), r#"a<span class="highlight">+</span>b"#);
/// assert_eq!(highlight("unchanged", "  "), "unchanged");
/// ```
pub fn highlight(text: &str, search: &str) -> String {
    let tokens = tokenize(search);
    if tokens.is_empty() {
        return text.to_string();
    }
    let mut alternatives: Vec<String> = tokens.iter().map(|t| regex::escape(t)).collect();
    // Longest first, so overlapping tokens highlight the wider match.
    alternatives.sort_by_key(|t| std::cmp::Reverse(t.len()));

    match RegexBuilder::new(&alternatives.join("|"))
        .case_insensitive(true)
        .build()
    {
        Ok(pattern) => pattern
            .replace_all(text, r#"<span class="highlight">$0</span>"#)
            .into_owned(),
        Err(err) => {
            warn!(search = search, err:% = err; "Failed to build highlight pattern");
            text.to_string()
        }
    }
}
