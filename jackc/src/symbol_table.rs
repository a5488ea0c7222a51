// ===============================================
// Metadata — symbol_table v0.1.0
// ===============================================
// _component_:     two-tier symbol table
// _description_:   Tracks every declared name's type, VM segment, and
//                  running index, at both class scope (static/field) and
//                  subroutine scope (argument/local). Subroutine scope is
//                  reset at the start of each subroutine and shadows class
//                  scope during lookup.
// ===============================================

use std::collections::HashMap;

use crate::error::{CompileError, CompileResult};
use crate::token::Segment;

/// One declared name's resolved binding.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub ty: String,
    pub segment: Segment,
    pub index: u16,
}

/// A single scope (class-level or subroutine-level): a name table plus a
/// running counter per segment that scope can hold.
#[derive(Debug, Default)]
struct Scope {
    entries: HashMap<String, Entry>,
    counters: HashMap<&'static str, u16>,
}

impl Scope {
    fn define(&mut self, name: &str, ty: &str, segment: Segment) -> CompileResult<()> {
        if self.entries.contains_key(name) {
            return Err(CompileError::redefined_symbol(name));
        }

        let counter = self.counters.entry(segment.as_str()).or_insert(0);
        let index = *counter;
        *counter += 1;

        self.entries.insert(
            name.to_string(),
            Entry {
                ty: ty.to_string(),
                segment,
                index,
            },
        );
        Ok(())
    }

    fn count(&self, segment: Segment) -> u16 {
        self.counters.get(segment.as_str()).copied().unwrap_or(0)
    }

    fn dump(&self) -> String {
        let mut rows: Vec<(&String, &Entry)> = self.entries.iter().collect();
        rows.sort_by_key(|(_, entry)| (entry.segment.as_str(), entry.index));

        rows.into_iter()
            .map(|(name, entry)| format!("{name}: {} {} {}", entry.ty, entry.segment, entry.index))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Bindings visible while compiling one class: a persistent class scope
/// (`static`/`field`, aliased to the `this` segment) plus a subroutine
/// scope that is wiped clean at the start of every subroutine.
#[derive(Debug, Default)]
pub struct SymbolTable {
    class_scope: Scope,
    subroutine_scope: Scope,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    /// Declares a `static` or `field` name at class scope. `field` is
    /// stored under the `this` segment — the two names in the spec denote
    /// the same VM segment.
    pub fn define_class_var(
        &mut self,
        name: &str,
        ty: &str,
        kind: ClassVarKind,
    ) -> CompileResult<()> {
        let segment = match kind {
            ClassVarKind::Static => Segment::Static,
            ClassVarKind::Field => Segment::This,
        };
        self.class_scope.define(name, ty, segment)
    }

    /// Declares an `argument` or `local` name at subroutine scope.
    pub fn define_subroutine_var(
        &mut self,
        name: &str,
        ty: &str,
        kind: SubroutineVarKind,
    ) -> CompileResult<()> {
        let segment = match kind {
            SubroutineVarKind::Argument => Segment::Argument,
            SubroutineVarKind::Local => Segment::Local,
        };
        self.subroutine_scope.define(name, ty, segment)
    }

    /// Clears the subroutine scope; called once per subroutine, before its
    /// parameter list is compiled.
    pub fn start_subroutine(&mut self) {
        self.subroutine_scope = Scope::default();
    }

    /// Installs the implicit receiver a `method` is compiled with: `this`
    /// bound to `class_name` at `argument` index 0, ahead of the
    /// subroutine's declared parameters.
    pub fn define_this_receiver(&mut self, class_name: &str) -> CompileResult<()> {
        self.subroutine_scope
            .define("this", class_name, Segment::Argument)
    }

    /// Looks up `name`, preferring the subroutine scope (it shadows the
    /// class scope) over the class scope.
    pub fn resolve(&self, name: &str) -> Option<&Entry> {
        self.subroutine_scope
            .entries
            .get(name)
            .or_else(|| self.class_scope.entries.get(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// How many names have been defined under `segment`, counting both
    /// scopes (a given segment only ever lives in one of the two).
    pub fn var_count(&self, segment: Segment) -> u16 {
        self.class_scope.count(segment) + self.subroutine_scope.count(segment)
    }

    /// Renders the class scope as `<name>: <type> <segment> <index>` lines,
    /// one per entry, ordered by index. Used for the `debug_mode` dump.
    pub fn dump_class_scope(&self) -> String {
        self.class_scope.dump()
    }

    /// Same as [`SymbolTable::dump_class_scope`] but for the subroutine scope.
    pub fn dump_subroutine_scope(&self) -> String {
        self.subroutine_scope.dump()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassVarKind {
    Static,
    Field,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubroutineVarKind {
    Argument,
    Local,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_vars_are_aliased_to_the_this_segment() {
        let mut table = SymbolTable::new();
        table
            .define_class_var("x", "int", ClassVarKind::Field)
            .unwrap();
        table
            .define_class_var("y", "int", ClassVarKind::Field)
            .unwrap();

        assert_eq!(table.var_count(Segment::This), 2);
        assert_eq!(table.resolve("y").unwrap().index, 1);
    }

    #[test]
    fn subroutine_scope_shadows_class_scope() {
        let mut table = SymbolTable::new();
        table
            .define_class_var("count", "int", ClassVarKind::Field)
            .unwrap();

        table.start_subroutine();
        table
            .define_subroutine_var("count", "int", SubroutineVarKind::Local)
            .unwrap();

        let entry = table.resolve("count").unwrap();
        assert_eq!(entry.segment, Segment::Local);
    }

    #[test]
    fn start_subroutine_clears_only_subroutine_scope() {
        let mut table = SymbolTable::new();
        table
            .define_class_var("total", "int", ClassVarKind::Static)
            .unwrap();

        table.start_subroutine();
        table
            .define_subroutine_var("i", "int", SubroutineVarKind::Local)
            .unwrap();
        table.start_subroutine();

        assert!(table.contains("total"));
        assert!(!table.contains("i"));
    }

    #[test]
    fn redefining_a_name_in_the_same_scope_is_a_semantic_error() {
        let mut table = SymbolTable::new();
        table
            .define_class_var("x", "int", ClassVarKind::Field)
            .unwrap();
        let err = table
            .define_class_var("x", "char", ClassVarKind::Field)
            .unwrap_err();
        assert!(matches!(err, CompileError::Semantic { .. }));
    }

    #[test]
    fn method_receiver_occupies_argument_zero() {
        let mut table = SymbolTable::new();
        table.start_subroutine();
        table.define_this_receiver("Foo").unwrap();
        table
            .define_subroutine_var("n", "int", SubroutineVarKind::Argument)
            .unwrap();

        assert_eq!(table.resolve("this").unwrap().index, 0);
        assert_eq!(table.resolve("n").unwrap().index, 1);
    }
}
