/// Benchmarks for relationship analysis over generated documents
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use related_lines::analysis::{RelationAnalyzer, find_related_lines};
use related_lines::document::{Selection, TextDocument};

/// Generate a JavaScript module with `classes` classes of a few methods each
fn generate_source(classes: usize) -> String {
    let mut source = String::from("import { Store } from './store';\nconst path = require('path');\n\n");

    for i in 0..classes {
        source.push_str(&format!(
            r#"class Service{i} {{
  constructor(store) {{
    this.store = store;
    this.count = 0;
  }}

  load(id) {{
    try {{
      const item = this.store.get(id);
      if (item) {{
        this.count += 1;
        return item;
      }} else {{
        return null;
      }}
    }} catch (e) {{
      report(e);
    }}
  }}

  loadAll(ids) {{
    const results = [];
    for (const id of ids) {{
      if (!id) continue;
      results.push(this.load(id));
    }}
    return results;
  }}
}}

"#
        ));
    }

    source.push_str("function report(e) {\n  console.error(e);\n}\n");
    source
}

fn bench_find_related_lines(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_related_lines");

    for classes in [1, 10, 50] {
        let document = TextDocument::from_text(&generate_source(classes), "javascript");
        // `this.count += 1;` inside the first class
        let target = 13;

        group.bench_with_input(BenchmarkId::from_parameter(classes), &document, |b, doc| {
            b.iter(|| find_related_lines(black_box(doc), black_box(target)));
        });
    }

    group.finish();
}

fn bench_analyze_selection(c: &mut Criterion) {
    let document = TextDocument::from_text(&generate_source(10), "javascript");
    let analyzer = RelationAnalyzer::new();

    c.bench_function("analyze_code_selection", |b| {
        b.iter(|| analyzer.analyze_code_selection(black_box(&document), Selection::new(11, 14)))
    });
}

criterion_group!(benches, bench_find_related_lines, bench_analyze_selection);
criterion_main!(benches);
