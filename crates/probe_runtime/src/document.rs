//! A small in-memory document and the query capabilities over it.
//!
//! This is the demo snapshot source: hosts append text elements, commands
//! find them with `screen` queries, and the REPL re-renders the tree after
//! each run.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use probe_foundation::{
    Capability, Error, HostObject, RegexValue, Result, Value, arg, async_trait,
};

/// Kind reported for failed element queries.
pub const QUERY_ERROR: &str = "TestingLibraryElementError";

/// How long `findByText` waits by default.
pub const DEFAULT_FIND_TIMEOUT: Duration = Duration::from_millis(1000);

/// How often `findByText` re-queries the document.
const FIND_INTERVAL: Duration = Duration::from_millis(50);

// =============================================================================
// Document tree
// =============================================================================

/// Identifies an element for the lifetime of its document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(u64);

impl ElementId {
    /// The numeric id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug)]
struct ElementNode {
    text: String,
    test_id: Option<String>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

#[derive(Debug, Default)]
struct Tree {
    nodes: BTreeMap<ElementId, ElementNode>,
    roots: Vec<ElementId>,
    highlighted: Vec<ElementId>,
    next_id: u64,
}

impl Tree {
    fn insert(&mut self, parent: Option<ElementId>, text: &str, test_id: Option<&str>) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            ElementNode {
                text: text.to_string(),
                test_id: test_id.map(str::to_string),
                parent,
                children: Vec::new(),
            },
        );
        match parent.and_then(|p| self.nodes.get_mut(&p)) {
            Some(parent) => parent.children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    /// Elements below `scope` (or the whole document), depth first.
    fn descendants(&self, scope: Option<ElementId>) -> Vec<ElementId> {
        let start = match scope {
            Some(id) => self
                .nodes
                .get(&id)
                .map(|node| node.children.clone())
                .unwrap_or_default(),
            None => self.roots.clone(),
        };
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = start.into_iter().rev().collect();
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get(&id) {
                out.push(id);
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }

    fn remove(&mut self, id: ElementId) -> bool {
        let Some(node) = self.nodes.remove(&id) else {
            return false;
        };
        match node.parent.and_then(|p| self.nodes.get_mut(&p)) {
            Some(parent) => parent.children.retain(|c| *c != id),
            None => self.roots.retain(|r| *r != id),
        }
        for child in node.children {
            self.remove(child);
        }
        self.highlighted.retain(|h| *h != id);
        true
    }

    fn render_into(&self, id: ElementId, depth: usize, out: &mut String) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let marker = if self.highlighted.contains(&id) { "* " } else { "  " };
        out.push_str(marker);
        out.push_str(&"  ".repeat(depth));
        out.push_str(&markup(node));
        out.push('\n');
        for child in &node.children {
            self.render_into(*child, depth + 1, out);
        }
    }
}

fn markup(node: &ElementNode) -> String {
    match &node.test_id {
        Some(test_id) => format!("<div data-testid=\"{test_id}\">{}</div>", node.text),
        None => format!("<div>{}</div>", node.text),
    }
}

/// Collapses runs of whitespace and trims, the way text is compared.
fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Shared in-memory document. Clones are handles to the same tree.
#[derive(Clone, Debug, Default)]
pub struct Document {
    tree: Arc<RwLock<Tree>>,
}

impl Document {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A small page used by the `probe` binary.
    #[must_use]
    pub fn sample() -> Self {
        let document = Self::new();
        document.append("Welcome to Probe", None);
        let list = document.append("Items", Some("list"));
        for item in ["Item one", "Item two", "Item three"] {
            document.append_child(list, item, None);
        }
        document.append("Log in", Some("login"));
        document
    }

    /// Appends a top-level element.
    pub fn append(&self, text: &str, test_id: Option<&str>) -> ElementId {
        self.tree.write().insert(None, text, test_id)
    }

    /// Appends an element under `parent`. Returns `None` if `parent` is
    /// not in the document.
    pub fn append_child(
        &self,
        parent: ElementId,
        text: &str,
        test_id: Option<&str>,
    ) -> Option<ElementId> {
        let mut tree = self.tree.write();
        tree.nodes.contains_key(&parent).then(|| tree.insert(Some(parent), text, test_id))
    }

    /// Removes an element and its descendants.
    pub fn remove(&self, id: ElementId) -> bool {
        self.tree.write().remove(id)
    }

    /// Removes every element.
    pub fn clear(&self) {
        let mut tree = self.tree.write();
        tree.nodes.clear();
        tree.roots.clear();
        tree.highlighted.clear();
    }

    /// Returns true if `id` is still in the document.
    #[must_use]
    pub fn contains(&self, id: ElementId) -> bool {
        self.tree.read().nodes.contains_key(&id)
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.read().nodes.len()
    }

    /// Returns true if the document has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.read().nodes.is_empty()
    }

    /// Text of an element.
    #[must_use]
    pub fn text(&self, id: ElementId) -> Option<String> {
        self.tree.read().nodes.get(&id).map(|n| n.text.clone())
    }

    /// Test id of an element.
    #[must_use]
    pub fn test_id(&self, id: ElementId) -> Option<String> {
        self.tree.read().nodes.get(&id).and_then(|n| n.test_id.clone())
    }

    /// Children of an element.
    #[must_use]
    pub fn children(&self, id: ElementId) -> Vec<ElementId> {
        self.tree
            .read()
            .nodes
            .get(&id)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    /// Elements under `scope` whose text matches.
    #[must_use]
    pub fn find_by_text(&self, scope: Option<ElementId>, matcher: &TextMatch) -> Vec<ElementId> {
        let tree = self.tree.read();
        tree.descendants(scope)
            .into_iter()
            .filter(|id| tree.nodes.get(id).is_some_and(|n| matcher.matches(&n.text)))
            .collect()
    }

    /// Elements under `scope` with the given test id.
    #[must_use]
    pub fn find_by_test_id(&self, scope: Option<ElementId>, test_id: &str) -> Vec<ElementId> {
        let tree = self.tree.read();
        tree.descendants(scope)
            .into_iter()
            .filter(|id| {
                tree.nodes
                    .get(id)
                    .is_some_and(|n| n.test_id.as_deref() == Some(test_id))
            })
            .collect()
    }

    /// Replaces the highlighted set.
    pub fn highlight(&self, ids: Vec<ElementId>) {
        self.tree.write().highlighted = ids;
    }

    /// Currently highlighted elements.
    #[must_use]
    pub fn highlighted(&self) -> Vec<ElementId> {
        self.tree.read().highlighted.clone()
    }

    /// Renders the tree as indented markup; highlighted lines start with
    /// `*`.
    #[must_use]
    pub fn render(&self) -> String {
        let tree = self.tree.read();
        let mut out = String::new();
        for root in &tree.roots {
            tree.render_into(*root, 0, &mut out);
        }
        out
    }

    /// A value referring to an element of this document.
    #[must_use]
    pub fn element(&self, id: ElementId) -> Value {
        Value::host(Element {
            id,
            document: self.clone(),
        })
    }

    /// The capabilities this document exposes to commands: `document`,
    /// `screen`, `within` and `highlight`.
    #[must_use]
    pub fn capabilities(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("document", self.document_object()),
            ("screen", Value::object(queries(self, None, "Screen"))),
            ("within", self.within_fn()),
            ("highlight", self.highlight_fn()),
        ]
    }

    fn document_object(&self) -> Value {
        let append_doc = self.clone();
        let append_to_doc = self.clone();
        let remove_doc = self.clone();
        let clear_doc = self.clone();
        let later_doc = self.clone();

        let object = HostObject::new("Document")
            .with_fn("append", move |args| {
                let text = string_arg(&args, 0, "append")?;
                let test_id = optional_string(&args, 1);
                let id = append_doc.append(&text, test_id.as_deref());
                Ok(append_doc.element(id))
            })
            .with_fn("appendTo", move |args| {
                let parent = element_id(&arg(&args, 0))
                    .ok_or_else(|| type_error("appendTo expects an element"))?;
                let text = string_arg(&args, 1, "appendTo")?;
                let test_id = optional_string(&args, 2);
                let id = append_to_doc
                    .append_child(parent, &text, test_id.as_deref())
                    .ok_or_else(|| Error::host(QUERY_ERROR, "parent is not in the document"))?;
                Ok(append_to_doc.element(id))
            })
            .with_fn("remove", move |args| {
                let id = element_id(&arg(&args, 0))
                    .ok_or_else(|| type_error("remove expects an element"))?;
                Ok(Value::Bool(remove_doc.remove(id)))
            })
            .with_fn("clear", move |_| {
                clear_doc.clear();
                Ok(Value::Undefined)
            })
            .with_fn("appendLater", move |args| {
                let delay = millis_arg(&args, 0, "appendLater")?;
                let text = string_arg(&args, 1, "appendLater")?;
                let test_id = optional_string(&args, 2);
                let document = later_doc.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    document.append(&text, test_id.as_deref());
                });
                Ok(Value::Undefined)
            })
            .with_fn("failLater", move |args| {
                let delay = millis_arg(&args, 0, "failLater")?;
                let message = string_arg(&args, 1, "failLater")?;
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    tracing::error!(target: "app", "{message}");
                });
                Ok(Value::Undefined)
            });
        Value::object(object)
    }

    fn within_fn(&self) -> Value {
        let document = self.clone();
        Value::function("within", move |args| {
            let id = element_id(&arg(&args, 0))
                .ok_or_else(|| type_error("within expects an element"))?;
            if !document.contains(id) {
                return Err(Error::host(QUERY_ERROR, "container is not in the document"));
            }
            Ok(Value::object(queries(&document, Some(id), "BoundQueries")))
        })
    }

    fn highlight_fn(&self) -> Value {
        let document = self.clone();
        Value::function("highlight", move |args| {
            let target = arg(&args, 0);
            let ids = match &target {
                Value::List(items) => items.iter().map(element_id).collect::<Option<Vec<_>>>(),
                other => element_id(other).map(|id| vec![id]),
            };
            let ids = ids.ok_or_else(|| {
                Error::host("ReferenceError", "Cannot highlight undefined element")
            })?;
            document.highlight(ids);
            Ok(Value::Undefined)
        })
    }
}

// =============================================================================
// Text matching
// =============================================================================

/// A text query: an exact string or a regular expression.
#[derive(Clone, Debug, PartialEq)]
pub enum TextMatch {
    /// Matches whitespace-normalized text exactly.
    Exact(String),
    /// Matches text the pattern finds a match in.
    Pattern(RegexValue),
}

impl TextMatch {
    /// Builds a matcher from a command argument.
    ///
    /// # Errors
    /// Returns a `TypeError` if the value is neither a string nor a regex.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(Self::Exact(normalize(s))),
            Value::Regex(re) => Ok(Self::Pattern(re.clone())),
            other => Err(type_error(format!(
                "text matcher must be a string or regular expression, got {}",
                other.type_name()
            ))),
        }
    }

    /// Returns true if `text` matches.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        match self {
            Self::Exact(expected) => normalize(text) == *expected,
            Self::Pattern(re) => re.is_match(text),
        }
    }
}

impl fmt::Display for TextMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(s) => write!(f, "{s}"),
            Self::Pattern(re) => write!(f, "{re}"),
        }
    }
}

// =============================================================================
// Element capability
// =============================================================================

/// An element reference handed to commands.
struct Element {
    id: ElementId,
    document: Document,
}

#[async_trait]
impl Capability for Element {
    fn type_name(&self) -> &str {
        "HTMLElement"
    }

    fn member(&self, name: &str) -> Option<Value> {
        match name {
            #[allow(clippy::cast_precision_loss)]
            "elementId" => Some(Value::Number(self.id.get() as f64)),
            "isConnected" => Some(Value::Bool(self.document.contains(self.id))),
            "textContent" => Some(self.document.text(self.id).map_or(Value::Null, Value::from)),
            "testId" => Some(self.document.test_id(self.id).map_or(Value::Null, Value::from)),
            "children" => Some(Value::list(
                self.document
                    .children(self.id)
                    .into_iter()
                    .map(|child| self.document.element(child)),
            )),
            _ => None,
        }
    }

    fn member_names(&self) -> Vec<String> {
        ["children", "elementId", "isConnected", "testId", "textContent"]
            .map(String::from)
            .to_vec()
    }

    fn describe(&self) -> String {
        let tree = self.document.tree.read();
        match tree.nodes.get(&self.id) {
            Some(node) => markup(node),
            None => format!("<div> (detached {})", self.id),
        }
    }
}

/// Extracts the element id from an element value.
#[must_use]
pub fn element_id(value: &Value) -> Option<ElementId> {
    let host = value.as_host().filter(|h| h.type_name() == "HTMLElement")?;
    let id = host.member("elementId")?.as_number()?;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Some(ElementId(id as u64))
}

// =============================================================================
// Queries
// =============================================================================

enum By {
    Text(TextMatch),
    TestId(String),
}

impl By {
    fn text(args: &[Value]) -> Result<Self> {
        TextMatch::from_value(&arg(args, 0)).map(Self::Text)
    }

    fn test_id(args: &[Value]) -> Result<Self> {
        string_arg(args, 0, "getByTestId").map(Self::TestId)
    }

    fn run(&self, document: &Document, scope: Option<ElementId>) -> Vec<ElementId> {
        match self {
            Self::Text(matcher) => document.find_by_text(scope, matcher),
            Self::TestId(id) => document.find_by_test_id(scope, id),
        }
    }

    fn not_found(&self) -> Error {
        let message = match self {
            Self::Text(matcher) => format!(
                "Unable to find an element with the text: {matcher}. This could be because \
                 the text is broken up by multiple elements."
            ),
            Self::TestId(id) => format!("Unable to find an element by: [data-testid=\"{id}\"]"),
        };
        Error::host(QUERY_ERROR, message)
    }

    fn multiple(&self) -> Error {
        let message = match self {
            Self::Text(matcher) => format!("Found multiple elements with the text: {matcher}"),
            Self::TestId(id) => format!("Found multiple elements by: [data-testid=\"{id}\"]"),
        };
        Error::host(QUERY_ERROR, message)
    }

    /// Exactly one match, or an error.
    fn get(&self, document: &Document, scope: Option<ElementId>) -> Result<Value> {
        match self.run(document, scope).as_slice() {
            [id] => Ok(document.element(*id)),
            [] => Err(self.not_found()),
            _ => Err(self.multiple()),
        }
    }

    /// At most one match, or an error.
    fn query(&self, document: &Document, scope: Option<ElementId>) -> Result<Value> {
        match self.run(document, scope).as_slice() {
            [id] => Ok(document.element(*id)),
            [] => Ok(Value::Null),
            _ => Err(self.multiple()),
        }
    }

    /// At least one match, or an error.
    fn get_all(&self, document: &Document, scope: Option<ElementId>) -> Result<Value> {
        let ids = self.run(document, scope);
        if ids.is_empty() {
            return Err(self.not_found());
        }
        Ok(Value::list(ids.into_iter().map(|id| document.element(id))))
    }
}

/// Builds the query object for `screen` (no scope) or `within(el)`.
fn queries(document: &Document, scope: Option<ElementId>, name: &str) -> HostObject {
    let get_doc = document.clone();
    let query_doc = document.clone();
    let get_all_doc = document.clone();
    let query_all_doc = document.clone();
    let find_doc = document.clone();
    let test_id_doc = document.clone();
    let query_test_id_doc = document.clone();

    HostObject::new(name)
        .with_fn("getByText", move |args| By::text(&args)?.get(&get_doc, scope))
        .with_fn("queryByText", move |args| {
            By::text(&args)?.query(&query_doc, scope)
        })
        .with_fn("getAllByText", move |args| {
            By::text(&args)?.get_all(&get_all_doc, scope)
        })
        .with_fn("queryAllByText", move |args| {
            let by = By::text(&args)?;
            Ok(Value::list(
                by.run(&query_all_doc, scope)
                    .into_iter()
                    .map(|id| query_all_doc.element(id)),
            ))
        })
        .with_async_fn("findByText", move |args| {
            let document = find_doc.clone();
            async move {
                let by = By::text(&args)?;
                let timeout = match arg(&args, 1) {
                    Value::Undefined => DEFAULT_FIND_TIMEOUT,
                    _ => millis_arg(&args, 1, "findByText")?,
                };
                find(&by, &document, scope, timeout).await
            }
        })
        .with_fn("getByTestId", move |args| {
            By::test_id(&args)?.get(&test_id_doc, scope)
        })
        .with_fn("queryByTestId", move |args| {
            By::test_id(&args)?.query(&query_test_id_doc, scope)
        })
}

/// Polls until exactly one element matches or the timeout passes.
async fn find(
    by: &By,
    document: &Document,
    scope: Option<ElementId>,
    timeout: Duration,
) -> Result<Value> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        match by.get(document, scope) {
            Ok(value) => return Ok(value),
            Err(error) if tokio::time::Instant::now() >= deadline => return Err(error),
            Err(_) => tokio::time::sleep(FIND_INTERVAL).await,
        }
    }
}

// =============================================================================
// Argument helpers
// =============================================================================

fn type_error(message: impl Into<String>) -> Error {
    Error::host("TypeError", message)
}

fn string_arg(args: &[Value], index: usize, function: &str) -> Result<String> {
    arg(args, index)
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| type_error(format!("{function} expects a string argument")))
}

fn optional_string(args: &[Value], index: usize) -> Option<String> {
    arg(args, index).as_str().map(str::to_string)
}

fn millis_arg(args: &[Value], index: usize, function: &str) -> Result<Duration> {
    match arg(args, index).as_number() {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Some(ms) if ms >= 0.0 && ms.is_finite() => Ok(Duration::from_millis(ms as u64)),
        _ => Err(type_error(format!(
            "{function} expects a non-negative number of milliseconds"
        ))),
    }
}
