//! The canonical type pool.

use quill_core::{CompilationError, DeclKind, Span, TypeHash};
use rustc_hash::FxHashMap;
use tracing::trace;

use super::{FunctionType, Param, StructType, Type, TypeId};

/// Pool of canonical types keyed by structural identity.
///
/// Interning a type whose structural name is already present returns the
/// existing handle, so every distinct type has exactly one [`TypeId`].
/// The builtins `$Void`, `$Any`, `$Null` and `Int` are interned on
/// construction at the fixed ids in [`TypeId`].
#[derive(Debug, Clone)]
pub struct TypeDictionary {
    types: Vec<Type>,
    names: Vec<String>,
    by_hash: FxHashMap<TypeHash, TypeId>,
}

impl Default for TypeDictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeDictionary {
    pub fn new() -> Self {
        let mut dict = Self {
            types: Vec::new(),
            names: Vec::new(),
            by_hash: FxHashMap::default(),
        };
        for (expected, ty, name) in [
            (TypeId::VOID, Type::Void, "$Void"),
            (TypeId::ANY, Type::Any, "$Any"),
            (TypeId::NULL, Type::Null, "$Null"),
            (TypeId::INT, Type::Int, "Int"),
        ] {
            let id = dict.insert(TypeHash::from_type_name(name), name.to_string(), ty);
            debug_assert_eq!(id, expected);
        }
        dict
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// The type behind `id`.
    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.index()]
    }

    /// The structural name of `id` (`Int`, `Tree?`, `[Int,Int]`, ...).
    pub fn name(&self, id: TypeId) -> &str {
        &self.names[id.index()]
    }

    /// Find a non-function type by structural name.
    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.by_hash.get(&TypeHash::from_type_name(name)).copied()
    }

    /// Find a function type by function name.
    pub fn lookup_function(&self, name: &str) -> Option<TypeId> {
        self.by_hash
            .get(&TypeHash::from_function_name(name))
            .copied()
    }

    /// Number of canonical types, builtins included.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    // ==========================================================================
    // Interning
    // ==========================================================================

    /// Return the canonical instance of `ty`, registering it if it is new.
    ///
    /// Fails for a nullable non-reference type and for an array of arrays.
    pub fn intern(&mut self, ty: Type, span: Span) -> Result<TypeId, CompilationError> {
        let (hash, name) = match &ty {
            Type::Void => return Ok(TypeId::VOID),
            Type::Any => return Ok(TypeId::ANY),
            Type::Null => return Ok(TypeId::NULL),
            Type::Int => return Ok(TypeId::INT),
            Type::Nullable(base) => {
                if !self.get(*base).is_reference() {
                    return Err(CompilationError::NullablePrimitive {
                        type_name: self.name(*base).to_string(),
                        span,
                    });
                }
                let name = format!("{}?", self.name(*base));
                (TypeHash::from_type_name(&name), name)
            }
            Type::Array(element) => {
                if matches!(self.get(*element), Type::Array(_)) {
                    return Err(CompilationError::ArrayOfArray { span });
                }
                let name = format!("[{},{}]", self.name(*element), self.name(TypeId::INT));
                (TypeHash::from_type_name(&name), name)
            }
            Type::Struct(s) => (TypeHash::from_type_name(&s.name), s.name.clone()),
            Type::Function(f) => (TypeHash::from_function_name(&f.name), f.name.clone()),
        };

        if let Some(&id) = self.by_hash.get(&hash) {
            return Ok(id);
        }
        Ok(self.insert(hash, name, ty))
    }

    fn insert(&mut self, hash: TypeHash, name: String, ty: Type) -> TypeId {
        let id = TypeId::new(self.types.len());
        trace!(type_name = %name, ?id, "interned type");
        self.types.push(ty);
        self.names.push(name);
        self.by_hash.insert(hash, id);
        id
    }

    /// The struct called `name`, created pending if it does not exist yet.
    pub fn intern_struct(&mut self, name: &str, span: Span) -> Result<TypeId, CompilationError> {
        self.intern(Type::Struct(StructType::new(name)), span)
    }

    /// `base?`
    pub fn make_nullable(&mut self, base: TypeId, span: Span) -> Result<TypeId, CompilationError> {
        self.intern(Type::Nullable(base), span)
    }

    /// `[element]`, or `[element]?` when `nullable`.
    ///
    /// The element must be `Int`, a struct or a nullable struct.
    pub fn make_array_type(
        &mut self,
        element: TypeId,
        nullable: bool,
        span: Span,
    ) -> Result<TypeId, CompilationError> {
        let supported = match self.get(element) {
            Type::Int | Type::Struct(_) => true,
            Type::Nullable(base) => matches!(self.get(*base), Type::Struct(_)),
            Type::Array(_) => return Err(CompilationError::ArrayOfArray { span }),
            _ => false,
        };
        if !supported {
            return Err(CompilationError::UnsupportedArrayElement {
                type_name: self.name(element).to_string(),
                span,
            });
        }

        let array = self.intern(Type::Array(element), span)?;
        if nullable {
            self.make_nullable(array, span)
        } else {
            Ok(array)
        }
    }

    /// Unify the types of a loosely typed variable and its initializer.
    ///
    /// `$Null` with a struct or array gives the nullable form, `$Any` gives
    /// the other side and equal types give themselves.
    pub fn merge(&mut self, t1: TypeId, t2: TypeId, span: Span) -> Result<TypeId, CompilationError> {
        if t1 == TypeId::NULL && self.get(t2).is_reference() {
            return self.make_nullable(t2, span);
        }
        if t2 == TypeId::NULL && self.get(t1).is_reference() {
            return self.make_nullable(t1, span);
        }
        if t1 == TypeId::ANY {
            return Ok(t2);
        }
        if t2 == TypeId::ANY || t1 == t2 {
            return Ok(t1);
        }
        Err(CompilationError::IncompatibleMerge {
            left: self.name(t1).to_string(),
            right: self.name(t2).to_string(),
            span,
        })
    }

    /// Whether a value of type `src` may be stored where `dst` is expected.
    pub fn is_assignable(&self, dst: TypeId, src: TypeId) -> bool {
        if dst == src {
            return true;
        }
        match self.get(dst) {
            Type::Nullable(base) => *base == src || src == TypeId::NULL,
            _ => false,
        }
    }

    // ==========================================================================
    // Reference helpers
    // ==========================================================================

    /// The struct type behind `id`, looking through one nullable wrapper.
    pub fn struct_of(&self, id: TypeId) -> Option<(TypeId, &StructType)> {
        let id = self.strip_nullable(id);
        self.get(id).as_struct().map(|s| (id, s))
    }

    /// The element type of the array behind `id`, looking through one
    /// nullable wrapper.
    pub fn element_of(&self, id: TypeId) -> Option<TypeId> {
        match self.get(self.strip_nullable(id)) {
            Type::Array(element) => Some(*element),
            _ => None,
        }
    }

    fn strip_nullable(&self, id: TypeId) -> TypeId {
        match self.get(id) {
            Type::Nullable(base) => *base,
            _ => id,
        }
    }

    // ==========================================================================
    // Struct and function construction
    // ==========================================================================

    /// Append a field to the pending struct `id`.
    pub fn add_field(
        &mut self,
        id: TypeId,
        name: &str,
        ty: TypeId,
        span: Span,
    ) -> Result<(), CompilationError> {
        let Type::Struct(s) = &mut self.types[id.index()] else {
            return Err(CompilationError::NotAStruct {
                type_name: self.names[id.index()].clone(),
                span,
            });
        };
        if !s.is_pending() {
            return Err(CompilationError::DuplicateDeclaration {
                kind: DeclKind::Struct,
                name: s.name.clone(),
                span,
            });
        }
        if s.field(name).is_some() {
            return Err(CompilationError::DuplicateDeclaration {
                kind: DeclKind::Field,
                name: name.to_string(),
                span,
            });
        }
        s.push_field(name.to_string(), ty);
        Ok(())
    }

    /// Seal the struct `id`; no more fields can be added.
    pub fn complete_struct(&mut self, id: TypeId) {
        if let Type::Struct(s) = &mut self.types[id.index()] {
            s.complete();
        }
    }

    pub fn add_param(&mut self, id: TypeId, param: Param) {
        if let Type::Function(f) = &mut self.types[id.index()] {
            f.push_param(param);
        }
    }

    pub fn set_return_type(&mut self, id: TypeId, ty: TypeId) {
        if let Type::Function(f) = &mut self.types[id.index()] {
            f.set_return_type(ty);
        }
    }

    pub fn function(&self, id: TypeId) -> Option<&FunctionType> {
        self.get(id).as_function()
    }

    // ==========================================================================
    // Rendering
    // ==========================================================================

    /// Human-readable description of `id`.
    ///
    /// Structs list their fields (`struct Tree{left: Tree?;right: Tree?;}`),
    /// functions their signature (`func add(a: Int,b: Int)->Int`); every
    /// other type describes as its name.
    pub fn describe(&self, id: TypeId) -> String {
        match self.get(id) {
            Type::Struct(s) => {
                let mut out = format!("struct {}{{", s.name);
                for field in s.fields() {
                    out.push_str(&format!("{}: {};", field.name, self.name(field.ty)));
                }
                out.push('}');
                out
            }
            Type::Function(f) => {
                let params: Vec<String> = f
                    .params()
                    .iter()
                    .map(|p| format!("{}: {}", p.name, self.name(p.ty)))
                    .collect();
                let mut out = format!("func {}({})", f.name, params.join(","));
                if f.return_type() != TypeId::VOID {
                    out.push_str("->");
                    out.push_str(self.name(f.return_type()));
                }
                out
            }
            _ => self.name(id).to_string(),
        }
    }
}
