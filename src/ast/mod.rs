/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the tree the parser hands to the
/// code generator.
///
/// Submodules:
/// - ast: Command/expression nodes and the marker-linked statement chains
pub mod ast;
