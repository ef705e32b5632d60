//! The flattening pass.
//!
//! [`flatten`] walks the program's actors in order and emits one Python
//! class per actor, one decorated method per handler. The line at which each
//! handler's own code begins is recorded as a [`SourceMapEntry`].
//!
//! The pass is a pure function of its inputs: method names come from a
//! counter owned by the call, so flattening the same program twice gives the
//! same text.

use pytch_core::asset::{filter_by_actor, AssetNames};
use pytch_core::{Actor, AssetMetaData, EventHandler, StructuredProgram};

use crate::source_map::SourceMapEntry;
use crate::{FlattenOptions, FlattenResult};

const HEADER: [&str; 3] = ["import pytch", "import random", "import math"];

/// Indentation of class-body lines (attributes, decorators, `def`).
const CLASS_INDENT: &str = "    ";

/// Flattens `program` with the default options.
pub fn flatten(program: &StructuredProgram, assets: &[AssetMetaData]) -> FlattenResult {
    flatten_with_options(program, assets, &FlattenOptions::default())
}

/// Flattens `program`, listing for each actor those of `assets` named under
/// that actor's ID.
pub fn flatten_with_options(
    program: &StructuredProgram,
    assets: &[AssetMetaData],
    options: &FlattenOptions,
) -> FlattenResult {
    let mut emitter = Emitter::new(options);

    for line in HEADER {
        emitter.push(line.to_string());
    }
    for actor in program.actors() {
        emitter.emit_actor(actor, assets);
    }

    let result = emitter.finish();
    tracing::debug!(
        n_actors = program.actors().len(),
        n_handlers = result.map_entries.len(),
        n_bytes = result.code_text.len(),
        "flattened program"
    );
    result
}

struct Emitter {
    lines: Vec<String>,
    map_entries: Vec<SourceMapEntry>,
    next_gensym: u32,
    body_indent: String,
}

impl Emitter {
    fn new(options: &FlattenOptions) -> Self {
        Emitter {
            lines: Vec::new(),
            map_entries: Vec::new(),
            next_gensym: options.gensym_seed,
            body_indent: " ".repeat(options.body_indent),
        }
    }

    fn push(&mut self, line: String) {
        self.lines.push(line);
    }

    /// One-based number of the line that the next `push` will emit.
    fn next_line_number(&self) -> usize {
        self.lines.len() + 1
    }

    fn gensym(&mut self) -> String {
        let name = format!("_pytch_handler_{}", self.next_gensym);
        self.next_gensym += 1;
        name
    }

    fn emit_actor(&mut self, actor: &Actor, assets: &[AssetMetaData]) {
        self.push(format!(
            "class {}(pytch.{}):",
            actor.name,
            actor.kind.base_class_name()
        ));

        let actor_assets = filter_by_actor(assets, actor.id);
        self.emit_asset_list(actor.kind.appearances_attribute(), &actor_assets.appearances);
        self.emit_asset_list("Sounds", &actor_assets.sounds);

        for handler in &actor.handlers {
            self.emit_handler(actor, handler);
        }
    }

    fn emit_asset_list(&mut self, attribute: &str, assets: &[AssetNames]) {
        self.push(format!("{}{} = [", CLASS_INDENT, attribute));
        for asset in assets {
            self.push(format!(
                "{}{}(\"{}\", \"{}\"),",
                CLASS_INDENT, CLASS_INDENT, asset.basename, asset.full_pathname
            ));
        }
        self.push(format!("{}]", CLASS_INDENT));
    }

    fn emit_handler(&mut self, actor: &Actor, handler: &EventHandler) {
        self.push(format!("{}{}", CLASS_INDENT, handler.event.decorator()));
        let method_name = self.gensym();
        self.push(format!("{}def {}(self):", CLASS_INDENT, method_name));
        self.push(format!("{}pass", self.body_indent));

        self.map_entries.push(SourceMapEntry {
            start_line: self.next_line_number(),
            actor_id: actor.id,
            handler_id: handler.id,
        });

        for code_line in handler.python_code.split('\n') {
            let code_line = code_line.strip_suffix('\r').unwrap_or(code_line);
            self.push(format!("{}{}", self.body_indent, code_line));
        }
    }

    fn finish(self) -> FlattenResult {
        FlattenResult {
            code_text: self.lines.join("\n"),
            map_entries: self.map_entries,
        }
    }
}
