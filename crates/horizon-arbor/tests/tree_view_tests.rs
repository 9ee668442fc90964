//! Integration tests for the tree view against a mock data source.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use horizon_arbor::model::{IndexPath, NodeInsertion, TreeDataSource, TreeNode, TreeViewDelegate};
use horizon_arbor::view::{RowsChanged, ScrollPosition, TreeView};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct TestNode {
    identifier: String,
    expandable: bool,
}

impl TestNode {
    fn folder(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            expandable: true,
        }
    }

    fn leaf(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            expandable: false,
        }
    }
}

impl TreeNode for TestNode {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn is_expandable(&self) -> bool {
        self.expandable
    }
}

/// Roots per section; children keyed by their parent's identifier.
#[derive(Default)]
struct MockSource {
    roots: RwLock<Vec<Vec<TestNode>>>,
    children: RwLock<HashMap<String, Vec<TestNode>>>,
}

impl MockSource {
    fn new(roots: Vec<TestNode>) -> Arc<Self> {
        Arc::new(Self {
            roots: RwLock::new(vec![roots]),
            children: RwLock::default(),
        })
    }

    fn set_children(&self, parent: &str, children: Vec<TestNode>) {
        self.children.write().insert(parent.to_owned(), children);
    }

    fn insert_child(&self, parent: &str, index: usize, child: TestNode) {
        self.children
            .write()
            .entry(parent.to_owned())
            .or_default()
            .insert(index, child);
    }

    fn resolve(&self, index: IndexPath, parent: Option<&TestNode>) -> TestNode {
        self.node_at(index, parent).expect("node resolves")
    }
}

impl TreeDataSource for MockSource {
    type Node = TestNode;
    type Cell = String;

    fn section_count(&self) -> usize {
        self.roots.read().len()
    }

    fn child_count(&self, section: usize, parent: Option<&TestNode>) -> usize {
        match parent {
            None => self.roots.read().get(section).map_or(0, Vec::len),
            Some(parent) => self
                .children
                .read()
                .get(parent.identifier())
                .map_or(0, Vec::len),
        }
    }

    fn node_at(&self, index: IndexPath, parent: Option<&TestNode>) -> Option<TestNode> {
        match parent {
            None => self.roots.read().get(index.section())?.get(index.row()).cloned(),
            Some(parent) => self
                .children
                .read()
                .get(parent.identifier())?
                .get(index.row())
                .cloned(),
        }
    }

    fn cell_for_node(&self, index: IndexPath, parent: Option<&TestNode>, is_expanded: bool) -> String {
        let node = self.resolve(index, parent);
        format!("{}{}", node.identifier, if is_expanded { " (open)" } else { "" })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Expanded(String),
    Collapsed(String),
    Selected(String),
    Delete(String),
}

/// Records lifecycle callbacks by resolving the node they refer to.
struct RecordingDelegate {
    source: Arc<MockSource>,
    events: Mutex<Vec<Event>>,
    log: Option<Arc<Mutex<Vec<String>>>>,
}

impl RecordingDelegate {
    fn new(source: &Arc<MockSource>) -> Arc<Self> {
        Arc::new(Self {
            source: source.clone(),
            events: Mutex::new(Vec::new()),
            log: None,
        })
    }

    fn with_log(source: &Arc<MockSource>, log: Arc<Mutex<Vec<String>>>) -> Arc<Self> {
        Arc::new(Self {
            source: source.clone(),
            events: Mutex::new(Vec::new()),
            log: Some(log),
        })
    }

    fn record(&self, event: Event) {
        if let Some(log) = &self.log {
            log.lock().push(format!("{event:?}"));
        }
        self.events.lock().push(event);
    }

    fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    fn name(&self, index: IndexPath, parent: Option<&TestNode>) -> String {
        self.source.resolve(index, parent).identifier
    }
}

impl TreeViewDelegate<TestNode> for RecordingDelegate {
    fn height_for_node(&self, index: IndexPath, parent: Option<&TestNode>) -> Option<f32> {
        parent.map(|_| 30.0 + index.row() as f32)
    }

    fn can_edit_node(&self, _index: IndexPath, parent: Option<&TestNode>) -> bool {
        parent.is_some()
    }

    fn commit_delete(&self, index: IndexPath, parent: Option<&TestNode>) {
        self.record(Event::Delete(self.name(index, parent)));
    }

    fn did_expand_node(&self, index: IndexPath, parent: Option<&TestNode>) {
        self.record(Event::Expanded(self.name(index, parent)));
    }

    fn did_collapse_node(&self, index: IndexPath, parent: Option<&TestNode>) {
        self.record(Event::Collapsed(self.name(index, parent)));
    }

    fn did_select_node(&self, index: IndexPath, parent: Option<&TestNode>) {
        self.record(Event::Selected(self.name(index, parent)));
    }
}

fn children(prefix: &str, count: usize) -> Vec<TestNode> {
    (0..count).map(|i| TestNode::leaf(format!("{prefix}{i}"))).collect()
}

/// root0 [100 leaves], root1 (leaf)
fn scenario_a() -> (Arc<MockSource>, TreeView<MockSource>) {
    let source = MockSource::new(vec![TestNode::folder("root0"), TestNode::leaf("root1")]);
    source.set_children("root0", children("child", 100));
    let view = TreeView::new().with_data_source(source.clone());
    (source, view)
}

fn identifiers(view: &TreeView<MockSource>, section: usize) -> Vec<String> {
    view.records(section)
        .iter()
        .map(|record| record.identifier().to_owned())
        .collect()
}

#[test]
fn test_no_data_source() {
    let mut view: TreeView<MockSource> = TreeView::new();
    assert_eq!(view.number_of_sections(), 0);
    assert_eq!(view.row_count(0), 0);
    assert!(!view.expand(&TestNode::folder("x"), 0));
}

#[test]
fn test_load_roots() {
    init_tracing();
    let (_source, mut view) = scenario_a();

    assert_eq!(view.number_of_sections(), 1);
    assert_eq!(view.total_rows(0), 0); // not loaded yet
    assert_eq!(view.row_count(0), 2);
    assert_eq!(view.visible_children_count(None, 0), 2);
    assert!(view.records(0).iter().all(|r| r.indentation_level() == 0));
}

#[test]
fn test_scenario_a_expand_then_collapse() {
    init_tracing();
    let (_source, mut view) = scenario_a();
    let root0 = TestNode::folder("root0");
    view.row_count(0);

    assert!(view.expand(&root0, 0));
    assert_eq!(view.total_rows(0), 102);
    assert_eq!(view.visible_children_count(Some(&root0), 0), 100);

    assert!(view.collapse(&root0, 0));
    assert_eq!(view.total_rows(0), 2);
}

#[test]
fn test_scenario_b_independent_subtrees() {
    let source = MockSource::new(vec![TestNode::folder("root0"), TestNode::folder("root1")]);
    source.set_children("root0", children("child", 100));
    source.set_children("root1", children("child", 100));
    let mut view = TreeView::new().with_data_source(source.clone());

    let root0 = TestNode::folder("root0");
    let root1 = TestNode::folder("root1");
    assert!(view.expand(&root0, 0));
    assert!(view.expand(&root1, 0));
    assert_eq!(view.total_rows(0), 202);

    assert!(view.collapse(&root1, 0));
    assert_eq!(view.total_rows(0), 102);
    assert!(view.is_expanded(&root0, 0));
    assert_eq!(view.visible_children_count(Some(&root0), 0), 100);
}

#[test]
fn test_scenario_c_insert_under_collapsed_parent() {
    let (source, mut view) = scenario_a();
    let root0 = TestNode::folder("root0");
    view.row_count(0);

    let inserted = Arc::new(Mutex::new(Vec::new()));
    let sink = inserted.clone();
    view.rows_inserted.connect(move |change| sink.lock().push(*change));

    source.insert_child("root0", 0, TestNode::leaf("new"));
    let outcome = view.insert_node(IndexPath::new(0, 0), Some(&root0));
    assert_eq!(outcome, Some(NodeInsertion::Deferred));
    assert_eq!(view.total_rows(0), 2);
    assert!(inserted.lock().is_empty());

    // The new node shows up once the parent expands.
    view.expand(&root0, 0);
    assert_eq!(view.total_rows(0), 103);
    assert_eq!(view.index_path_of_identifier("new", 0), Some(IndexPath::new(1, 0)));
    assert_eq!(inserted.lock().len(), 1);
}

#[test]
fn test_scenario_d_remove_expanded_node() {
    let source = MockSource::new(vec![TestNode::folder("a"), TestNode::leaf("z")]);
    source.set_children("a", vec![TestNode::folder("b"), TestNode::leaf("c")]);
    source.set_children("b", children("d", 3));
    let mut view = TreeView::new().with_data_source(source.clone());
    view.expand(&TestNode::folder("a"), 0);
    view.expand(&TestNode::folder("b"), 0);
    assert_eq!(view.total_rows(0), 7);

    let removed = Arc::new(Mutex::new(Vec::new()));
    let sink = removed.clone();
    view.rows_removed.connect(move |change| sink.lock().push(*change));

    assert_eq!(view.remove_node("a", 0), Some(0..=5));
    assert_eq!(identifiers(&view, 0), vec!["z"]);

    let events = removed.lock();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].rows(), 0..=5);
    assert_eq!(events[0].len(), 6);

    assert_eq!(view.remove_node("a", 0), None);
}

#[test]
fn test_expand_is_idempotent() {
    let (source, mut view) = scenario_a();
    let delegate = RecordingDelegate::new(&source);
    view.set_delegate(delegate.clone());
    let root0 = TestNode::folder("root0");

    assert!(view.expand(&root0, 0));
    let rows = identifiers(&view, 0);
    assert!(view.expand(&root0, 0));
    assert_eq!(identifiers(&view, 0), rows);
    assert_eq!(delegate.events(), vec![Event::Expanded("root0".into())]);
}

#[test]
fn test_collapse_never_expanded_node() {
    let (_source, mut view) = scenario_a();
    let removed = Arc::new(Mutex::new(0));
    let sink = removed.clone();
    view.rows_removed.connect(move |_| *sink.lock() += 1);

    assert!(view.collapse(&TestNode::folder("root0"), 0));
    assert_eq!(view.total_rows(0), 2);
    assert_eq!(*removed.lock(), 0);
}

#[test]
fn test_expand_then_collapse_restores_rows() {
    let source = MockSource::new(vec![TestNode::folder("a"), TestNode::folder("b")]);
    source.set_children("a", vec![TestNode::folder("a0"), TestNode::leaf("a1")]);
    source.set_children("a0", children("x", 4));
    let mut view = TreeView::new().with_data_source(source.clone());
    view.row_count(0);
    let before = identifiers(&view, 0);

    view.expand(&TestNode::folder("a"), 0);
    view.expand(&TestNode::folder("a0"), 0);
    view.collapse(&TestNode::folder("a"), 0);

    assert_eq!(identifiers(&view, 0), before);
}

#[test]
fn test_expand_range_and_levels() {
    let source = MockSource::new(vec![TestNode::leaf("first"), TestNode::folder("a")]);
    source.set_children("a", vec![TestNode::folder("a0"), TestNode::leaf("a1")]);
    source.set_children("a0", children("x", 3));
    let mut view = TreeView::new().with_data_source(source.clone());
    view.expand(&TestNode::folder("a"), 0);

    let inserted = Arc::new(Mutex::new(Vec::new()));
    let sink = inserted.clone();
    view.rows_inserted.connect(move |change| sink.lock().push(*change));

    // a0 sits at row 2 with level 1.
    assert!(view.expand(&TestNode::folder("a0"), 0));
    let change: RowsChanged = inserted.lock()[0];
    assert_eq!(change.rows(), 3..=5);
    for row in change.rows() {
        assert_eq!(view.records(0)[row].indentation_level(), 2);
        assert_eq!(view.records(0)[row].parent_identifier(), Some("a0"));
    }
}

#[test]
fn test_collapse_removes_grandchildren() {
    let source = MockSource::new(vec![TestNode::folder("a")]);
    source.set_children("a", vec![TestNode::folder("b"), TestNode::leaf("c")]);
    source.set_children("b", children("g", 5));
    let mut view = TreeView::new().with_data_source(source.clone());
    view.expand(&TestNode::folder("a"), 0);
    view.expand(&TestNode::folder("b"), 0);

    let removed = Arc::new(Mutex::new(Vec::new()));
    let sink = removed.clone();
    view.rows_removed.connect(move |change| sink.lock().push(*change));

    view.collapse(&TestNode::folder("a"), 0);
    let events = removed.lock();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].len(), 2 + 5);
    assert_eq!(view.total_rows(0), 1);
}

#[test]
fn test_empty_expandable_node() {
    let source = MockSource::new(vec![TestNode::folder("empty")]);
    let mut view = TreeView::new().with_data_source(source.clone());
    let delegate = RecordingDelegate::new(&source);
    view.set_delegate(delegate.clone());
    let empty = TestNode::folder("empty");

    assert!(view.expand(&empty, 0));
    assert!(view.is_expanded(&empty, 0));
    assert_eq!(view.total_rows(0), 1);

    assert!(view.collapse(&empty, 0));
    assert!(!view.is_expanded(&empty, 0));
    assert_eq!(
        delegate.events(),
        vec![Event::Expanded("empty".into()), Event::Collapsed("empty".into())]
    );
}

#[test]
fn test_select_expandable_toggles() {
    let (source, mut view) = scenario_a();
    let delegate = RecordingDelegate::new(&source);
    view.set_delegate(delegate.clone());
    let root0 = TestNode::folder("root0");

    assert!(view.select(&root0, 0));
    assert!(view.is_expanded(&root0, 0));
    assert_eq!(view.selected_row(), Some(IndexPath::new(0, 0)));

    assert!(view.select(&root0, 0));
    assert!(!view.is_expanded(&root0, 0));
    assert_eq!(
        delegate.events(),
        vec![Event::Expanded("root0".into()), Event::Collapsed("root0".into())]
    );
}

#[test]
fn test_select_leaf_only_notifies_selection() {
    let (source, mut view) = scenario_a();
    let delegate = RecordingDelegate::new(&source);
    view.set_delegate(delegate.clone());

    let inserted = Arc::new(Mutex::new(0));
    let sink = inserted.clone();
    view.rows_inserted.connect(move |_| *sink.lock() += 1);

    assert!(view.select(&TestNode::leaf("root1"), 0));
    assert_eq!(delegate.events(), vec![Event::Selected("root1".into())]);
    assert_eq!(*inserted.lock(), 0);
    assert_eq!(view.total_rows(0), 2);
    assert_eq!(view.node_for_selected_row(), Some(TestNode::leaf("root1")));

    // Leaves cannot be expanded.
    assert!(!view.expand(&TestNode::leaf("root1"), 0));
    assert!(!view.select(&TestNode::leaf("missing"), 0));
}

#[test]
fn test_notifications_follow_mutation() {
    let (source, mut view) = scenario_a();
    let log = Arc::new(Mutex::new(Vec::new()));
    view.set_delegate(RecordingDelegate::with_log(&source, log.clone()));

    let sink = log.clone();
    view.rows_reloaded.connect(move |path| sink.lock().push(format!("reloaded {}", path.row())));
    let sink = log.clone();
    view.rows_inserted
        .connect(move |change| sink.lock().push(format!("inserted {}..={}", change.first, change.last)));
    let sink = log.clone();
    view.selection_changed.connect(move |path| sink.lock().push(format!("selected {path:?}")));

    view.row_count(0);
    view.did_select_row(IndexPath::new(1, 0));
    view.expand(&TestNode::folder("root0"), 0);

    assert_eq!(
        *log.lock(),
        vec![
            "selected Some(IndexPath(0:1))".to_owned(),
            "Selected(\"root1\")".to_owned(),
            "reloaded 0".to_owned(),
            "inserted 1..=100".to_owned(),
            "selected Some(IndexPath(0:101))".to_owned(),
            "Expanded(\"root0\")".to_owned(),
        ]
    );
}

#[test]
fn test_insert_positions_skip_expanded_siblings() {
    let source = MockSource::new(vec![TestNode::folder("a")]);
    source.set_children("a", vec![TestNode::folder("b"), TestNode::leaf("c")]);
    source.set_children("b", children("d", 2));
    let mut view = TreeView::new().with_data_source(source.clone());
    let a = TestNode::folder("a");
    view.expand(&a, 0);
    view.expand(&TestNode::folder("b"), 0);
    // a, b, d0, d1, c

    source.insert_child("a", 1, TestNode::leaf("between"));
    assert_eq!(
        view.insert_node(IndexPath::new(1, 0), Some(&a)),
        Some(NodeInsertion::Inserted { row: 4 })
    );

    source.insert_child("a", 3, TestNode::leaf("last"));
    assert_eq!(
        view.insert_node(IndexPath::new(3, 0), Some(&a)),
        Some(NodeInsertion::Inserted { row: 6 })
    );
    assert_eq!(identifiers(&view, 0), vec!["a", "b", "d0", "d1", "between", "c", "last"]);

    // The data source must already hold the node.
    assert_eq!(view.insert_node(IndexPath::new(9, 0), Some(&a)), None);
    // Leaves cannot be parents.
    assert_eq!(
        view.insert_node(IndexPath::new(0, 0), Some(&TestNode::leaf("c"))),
        None
    );
}

#[test]
fn test_insert_root() {
    let (source, mut view) = scenario_a();
    view.row_count(0);
    source.roots.write()[0].insert(1, TestNode::leaf("middle"));

    assert_eq!(
        view.insert_node(IndexPath::new(1, 0), None),
        Some(NodeInsertion::Inserted { row: 1 })
    );
    assert_eq!(identifiers(&view, 0), vec!["root0", "middle", "root1"]);
}

#[test]
fn test_insert_before_load_is_deferred() {
    let (source, mut view) = scenario_a();
    source.roots.write()[0].push(TestNode::leaf("late"));

    assert_eq!(
        view.insert_node(IndexPath::new(2, 0), None),
        Some(NodeInsertion::Deferred)
    );
    assert_eq!(view.row_count(0), 3);
}

#[test]
fn test_row_queries_use_tree_coordinates() {
    let (source, mut view) = scenario_a();
    let delegate = RecordingDelegate::new(&source);
    view.set_delegate(delegate.clone());
    view.expand(&TestNode::folder("root0"), 0);

    let cell = view.cell_for_row(IndexPath::new(0, 0)).unwrap();
    assert_eq!(cell.content, "root0 (open)");
    assert_eq!(cell.indentation_level, 0);

    let cell = view.cell_for_row(IndexPath::new(6, 0)).unwrap();
    assert_eq!(cell.content, "child5");
    assert_eq!(cell.indentation, 10.0);

    // Tree-relative row 5 under root0.
    assert_eq!(view.height_for_row(IndexPath::new(6, 0)), 35.0);
    assert_eq!(view.height_for_row(IndexPath::new(101, 0)), 44.0);
    assert!(view.can_edit_row(IndexPath::new(6, 0)));
    assert!(!view.can_edit_row(IndexPath::new(0, 0)));

    assert!(view.commit_delete_row(IndexPath::new(6, 0)));
    assert!(!view.commit_delete_row(IndexPath::new(500, 0)));
    assert_eq!(delegate.events().last(), Some(&Event::Delete("child5".into())));
}

#[test]
fn test_scroll_to_node() {
    let (_source, mut view) = scenario_a();
    view.row_count(0);

    let requests = Arc::new(Mutex::new(Vec::new()));
    let sink = requests.clone();
    view.scroll_requested.connect(move |request| sink.lock().push(*request));

    assert!(view.scroll_to_node(&TestNode::leaf("root1"), 0, ScrollPosition::Top));
    assert!(!view.scroll_to_node(&TestNode::leaf("nope"), 0, ScrollPosition::Top));

    let requests = requests.lock();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, IndexPath::new(1, 0));
    assert_eq!(requests[0].position, ScrollPosition::Top);
}

#[test]
fn test_reload_data_loads_every_section() {
    let source = MockSource::new(vec![TestNode::leaf("a")]);
    source.roots.write().push(vec![TestNode::leaf("b"), TestNode::leaf("c")]);
    let mut view = TreeView::new().with_data_source(source.clone());

    let resets = Arc::new(Mutex::new(0));
    let sink = resets.clone();
    view.tree_reset.connect(move |_| *sink.lock() += 1);

    view.reload_data();
    assert_eq!(view.total_rows(0), 1);
    assert_eq!(view.total_rows(1), 2);
    assert_eq!(*resets.lock(), 1);
}

/// Reports three roots but only has one.
struct LyingSource;

impl TreeDataSource for LyingSource {
    type Node = TestNode;
    type Cell = ();

    fn section_count(&self) -> usize {
        1
    }

    fn child_count(&self, _section: usize, _parent: Option<&TestNode>) -> usize {
        3
    }

    fn node_at(&self, index: IndexPath, _parent: Option<&TestNode>) -> Option<TestNode> {
        (index.row() == 0).then(|| TestNode::leaf("only"))
    }

    fn cell_for_node(&self, _index: IndexPath, _parent: Option<&TestNode>, _expanded: bool) {}
}

#[test]
#[should_panic(expected = "invalid data source")]
fn test_provider_contract_violation_halts() {
    let mut view = TreeView::new().with_data_source(Arc::new(LyingSource));
    view.row_count(0);
}
