//! Performance benchmarks for gtkdoc-rst
//!
//! Run with: cargo bench

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use gtkdoc_rst::{Registry, Unresolved, translate};

/// Sample gtk-doc comments of various sizes
mod samples {
    pub const TINY: &str = "Returns %TRUE if @widget is visible.";

    pub const SMALL: &str = r#"Flags a widget to be displayed.

Any widget that isn't shown will not appear on the screen.

Remember that you have to show the containers containing a widget,
in addition to the widget itself, before it will appear onscreen.

When a toplevel container is shown, it is immediately realized and
mapped; other shown widgets are realized and mapped when their
toplevel container is realized and mapped."#;

    pub const MEDIUM: &str = r#"The base class for all widgets.

`GtkWidget` is the base class all widgets in GTK derive from. It manages the
widget lifecycle, layout, states and style.

## Height-for-width Geometry Management

GTK uses a height-for-width (and width-for-height) geometry management
system. See [method@Gtk.Widget.measure] and #GtkSizeRequestMode.

- [vfunc@Gtk.Widget.get_request_mode]
- [vfunc@Gtk.Widget.measure]

|[<!-- language="C" -->
static void
foo_widget_measure (GtkWidget      *widget,
                    GtkOrientation  orientation,
                    int             for_size,
                    int            *minimum_size,
                    int            *natural_size)
{
  *minimum_size = 0;
}
]|

| Property | Type |
| --- | --- |
| [property@Gtk.Widget:can-focus] | #gboolean |
| [property@Gtk.Widget:name] | `char *` |

![An example widget](widget.png)

Call gtk_widget_show() after setting %GTK_ALIGN_START on _this_ widget."#;

    /// Generate a large document by repeating sections
    pub fn large() -> String {
        MEDIUM.repeat(40)
    }

    /// Many unmatched sigils on one line
    pub fn pathological_sigils() -> String {
        "` [ % # @ _ * <".repeat(2000)
    }

    /// Deeply nested quotes
    pub fn pathological_nested() -> String {
        "> ".repeat(100) + "deep\n"
    }
}

const REGISTRY: &str = r#"<repository xmlns="http://www.gtk.org/introspection/core/1.0"
            xmlns:c="http://www.gtk.org/introspection/c/1.0"
            xmlns:glib="http://www.gtk.org/introspection/glib/1.0">
  <namespace name="Gtk" version="4.0">
    <class name="Widget" c:type="GtkWidget" glib:type-name="GtkWidget">
      <method name="show" c:identifier="gtk_widget_show"/>
    </class>
    <enumeration name="SizeRequestMode" c:type="GtkSizeRequestMode"/>
    <enumeration name="Align" c:type="GtkAlign">
      <member name="start" value="1" c:identifier="GTK_ALIGN_START"/>
    </enumeration>
  </namespace>
</repository>"#;

fn bench_translate(c: &mut Criterion) {
    let mut group = c.benchmark_group("translate");

    for (name, input) in [
        ("tiny", samples::TINY),
        ("small", samples::SMALL),
        ("medium", samples::MEDIUM),
    ] {
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_function(name, |b| {
            b.iter(|| translate(black_box(input), &Unresolved, "Gtk", ""))
        });
    }

    let large = samples::large();
    group.throughput(Throughput::Bytes(large.len() as u64));
    group.bench_function("large", |b| {
        b.iter(|| translate(black_box(large.as_str()), &Unresolved, "Gtk", ""))
    });

    group.finish();
}

fn bench_registry(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry");

    group.throughput(Throughput::Bytes(REGISTRY.len() as u64));
    group.bench_function("parse", |b| b.iter(|| Registry::parse(black_box(REGISTRY))));

    if let Ok(registry) = Registry::parse(REGISTRY) {
        group.throughput(Throughput::Bytes(samples::MEDIUM.len() as u64));
        group.bench_function("translate_resolved", |b| {
            b.iter(|| translate(black_box(samples::MEDIUM), &registry, "", "https://docs.gtk.org/gtk4"))
        });
    }

    group.finish();
}

fn bench_pathological(c: &mut Criterion) {
    let mut group = c.benchmark_group("pathological");
    group.sample_size(20);

    let sigils = samples::pathological_sigils();
    group.throughput(Throughput::Bytes(sigils.len() as u64));
    group.bench_function("unmatched_sigils", |b| {
        b.iter(|| translate(black_box(sigils.as_str()), &Unresolved, "", ""))
    });

    let nested = samples::pathological_nested();
    group.throughput(Throughput::Bytes(nested.len() as u64));
    group.bench_function("nested_quotes", |b| {
        b.iter(|| translate(black_box(nested.as_str()), &Unresolved, "", ""))
    });

    group.finish();
}

criterion_group!(benches, bench_translate, bench_registry, bench_pathological);
criterion_main!(benches);
