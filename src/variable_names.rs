use crate::containers::HashMap;
use crate::engine::propagation::DemonId;
use crate::engine::variables::IntVar;

/// A propagation object that can carry a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropagationObject {
    Variable(IntVar),
    Constraint(usize),
    Demon(DemonId),
}

impl From<IntVar> for PropagationObject {
    fn from(var: IntVar) -> PropagationObject {
        PropagationObject::Variable(var)
    }
}

impl From<DemonId> for PropagationObject {
    fn from(demon: DemonId) -> PropagationObject {
        PropagationObject::Demon(demon)
    }
}

/// Name storage, keyed by object handle rather than by address so the
/// mapping stays stable however the backing storage moves.
#[derive(Debug, Default)]
pub(crate) struct PropagationObjectNames {
    names: HashMap<PropagationObject, String>,
}

impl PropagationObjectNames {
    /// Get the name associated with the object, if any.
    pub(crate) fn get_name(&self, object: PropagationObject) -> Option<&str> {
        self.names.get(&object).map(|name| name.as_str())
    }

    /// Name the object, overriding any existing name.
    pub(crate) fn set_name(&mut self, object: PropagationObject, name: String) {
        let _ = self.names.insert(object, name);
    }

    pub(crate) fn has_name(&self, object: PropagationObject) -> bool {
        self.names.contains_key(&object)
    }
}
