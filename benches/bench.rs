use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use edfs_tree::{Element, FileListing, Renderer, Tree, TreeNode, TreeState};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::StatefulWidget;

fn example_nodes() -> Vec<TreeNode> {
    vec![
        TreeNode::new_leaf("Alfa"),
        TreeNode::new(
            "Bravo",
            vec![
                TreeNode::new_leaf("Charlie"),
                TreeNode::new(
                    "Delta",
                    vec![TreeNode::new_leaf("Echo"), TreeNode::new_leaf("Foxtrot")],
                ),
                TreeNode::new_leaf("Golf"),
            ],
        ),
        TreeNode::new_leaf("Hotel"),
        TreeNode::new(
            "India",
            vec![
                TreeNode::new_leaf("Juliett"),
                TreeNode::new_leaf("Kilo"),
                TreeNode::new_leaf("Lima"),
                TreeNode::new_leaf("Mike"),
                TreeNode::new_leaf("November"),
            ],
        ),
        TreeNode::new_leaf("Oscar"),
        TreeNode::new(
            "Papa",
            vec![
                TreeNode::new_leaf("Quebec"),
                TreeNode::new_leaf("Romeo"),
                TreeNode::new_leaf("Sierra"),
                TreeNode::new_leaf("Tango"),
                TreeNode::new_leaf("Uniform"),
                TreeNode::new(
                    "Victor",
                    vec![
                        TreeNode::new_leaf("Whiskey"),
                        TreeNode::new_leaf("Xray"),
                        TreeNode::new_leaf("Yankee"),
                    ],
                ),
            ],
        ),
        TreeNode::new_leaf("Zulu"),
    ]
}

/// A directory tree with `width` entries per directory, `depth` levels deep.
fn wide_nodes(width: usize, depth: usize) -> Vec<TreeNode> {
    (0..width)
        .map(|index| {
            if depth == 0 {
                TreeNode::new_leaf(format!("file-{index}.txt"))
            } else {
                TreeNode::new(format!("dir-{index}"), wide_nodes(width, depth - 1))
            }
        })
        .collect()
}

fn listing_json(nodes: &[TreeNode]) -> String {
    let listing = FileListing {
        name: Some("/".to_owned()),
        children: nodes.to_vec(),
    };
    serde_json::to_string(&listing).unwrap()
}

const fn empty_nodes() -> &'static [TreeNode] {
    &[]
}

fn render_container(nodes: &[TreeNode]) -> Element {
    let mut container = Element::container("tree");
    Renderer::new().render(&mut container, nodes).unwrap();
    container
}

fn init(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("init");
    group.throughput(Throughput::Elements(1));

    group.bench_function("empty", |bencher| {
        bencher.iter(|| black_box(render_container(black_box(empty_nodes()))));
    });

    let nodes = example_nodes();
    group.bench_function("example-nodes", |bencher| {
        bencher.iter(|| black_box(render_container(black_box(&nodes))));
    });

    let nodes = wide_nodes(8, 3);
    group.bench_function("wide", |bencher| {
        bencher.iter(|| black_box(render_container(black_box(&nodes))));
    });

    let json = listing_json(&nodes);
    group.bench_function("decode-wide", |bencher| {
        bencher.iter(|| black_box(FileListing::from_json(black_box(&json)).unwrap()));
    });

    group.finish();
}

fn renders(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("render");
    group.throughput(Throughput::Elements(1)); // Frames per second

    let buffer_size = Rect::new(0, 0, 100, 100);

    let container = render_container(empty_nodes());
    group.bench_function("empty", |bencher| {
        bencher.iter_batched(
            TreeState::default,
            |mut state| {
                let mut buffer = Buffer::empty(buffer_size);
                black_box(Tree::new(&container)).render(
                    buffer_size,
                    black_box(&mut buffer),
                    &mut state,
                );
            },
            BatchSize::SmallInput,
        );
    });

    let container = render_container(&example_nodes());
    group.bench_function("example-nodes", |bencher| {
        bencher.iter_batched(
            || {
                let mut state = TreeState::default();
                state.open(vec![1]);
                state.open(vec![1, 1]);
                state
            },
            |mut state| {
                let mut buffer = Buffer::empty(buffer_size);
                black_box(Tree::new(&container)).render(
                    buffer_size,
                    black_box(&mut buffer),
                    &mut state,
                );
            },
            BatchSize::SmallInput,
        );
    });

    let container = render_container(&wide_nodes(8, 3));
    group.bench_function("wide-all-open", |bencher| {
        bencher.iter_batched(
            || {
                let mut state = TreeState::default();
                state.open_all(&container);
                state
            },
            |mut state| {
                let mut buffer = Buffer::empty(buffer_size);
                black_box(Tree::new(&container)).render(
                    buffer_size,
                    black_box(&mut buffer),
                    &mut state,
                );
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

/// Create flamegraphs with `cargo bench --bench bench -- --profile-time=5`
#[cfg(unix)]
fn profiled() -> Criterion {
    use pprof::criterion::{Output, PProfProfiler};
    Criterion::default().with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)))
}
#[cfg(not(unix))]
fn profiled() -> Criterion {
    Criterion::default()
}

criterion_group! {
    name = benches;
    config = profiled();
    targets = init, renders
}
criterion_main!(benches);
