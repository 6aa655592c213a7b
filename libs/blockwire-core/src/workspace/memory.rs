use std::collections::{BTreeMap, HashMap};

use nanoid::nanoid;
use serde::{ser::SerializeMap, Serialize, Serializer};

use super::*;
use crate::registry::{BlockArg, BlockDefinition, BlockOutput};

const DEFAULT_VARIABLE_NAME: &str = "item";

#[derive(Debug, Clone, Serialize)]
struct InputState {
    #[serde(skip_serializing_if = "Option::is_none")]
    check: Option<Vec<String>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    statement: bool,
    target: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct ParentLink {
    block: String,
    input: String,
}

#[derive(Debug, Clone, Serialize)]
struct BlockState {
    #[serde(rename = "type")]
    block_type: String,
    has_output: bool,
    output_check: Option<Vec<String>>,
    parent: Option<ParentLink>,
    inputs: BTreeMap<String, InputState>,
    fields: BTreeMap<String, FieldState>,
    position: (f64, f64),
}

impl BlockState {
    fn snapshot(&self, id: &str) -> BlockSnapshot {
        BlockSnapshot {
            id: id.to_owned(),
            block_type: self.block_type.clone(),
            output_check: self.output_check.clone(),
            output_connected: self.parent.is_some(),
        }
    }
}

/// Self-contained host surface keeping the block graph in memory.
///
/// User edits ([MemoryWorkspace::connect], [MemoryWorkspace::unplug]) are
/// reported to the change listeners, mutations through [WorkspaceAdapter]
/// are not. Edits made while listeners run are never reported.
pub struct MemoryWorkspace {
    id: String,
    registry: SharedRegistry,
    blocks: BTreeMap<String, BlockState>,
    variables: Vec<WorkspaceVariable>,
    listeners: Vec<(String, ChangeListener)>,
    categories: HashMap<String, CategoryCallback>,
    dispatching: bool,
}

impl MemoryWorkspace {
    pub fn new(registry: SharedRegistry) -> Self {
        Self::with_id(nanoid!(), registry)
    }

    pub fn with_id<S: Into<String>>(id: S, registry: SharedRegistry) -> Self {
        Self {
            id: id.into(),
            registry,
            blocks: BTreeMap::new(),
            variables: Vec::new(),
            listeners: Vec::new(),
            categories: HashMap::new(),
            dispatching: false,
        }
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn position(&self, block_id: &str) -> Option<(f64, f64)> {
        self.blocks.get(block_id).map(|block| block.position)
    }

    /// Parent block id and input name the block is plugged into.
    pub fn parent(&self, block_id: &str) -> Option<(String, String)> {
        self.blocks
            .get(block_id)
            .and_then(|block| block.parent.as_ref())
            .map(|parent| (parent.block.clone(), parent.input.clone()))
    }

    pub fn variable(&self, variable_id: &str) -> Option<&WorkspaceVariable> {
        self.variables.iter().find(|variable| variable.id == variable_id)
    }

    /// Contents of a toolbox category, `None` when nothing is registered
    /// under `name`.
    pub fn open_category(&self, name: &str) -> Option<Vec<ToolboxItem>> {
        self.categories.get(name).map(|callback| callback(self))
    }

    pub fn create_block(&mut self, block_type: &str) -> BlockwireResult<String> {
        self.create_block_with_variable(block_type, None)
    }

    /// Instantiate a toolbox entry.
    pub fn create_from_toolbox(&mut self, item: &ToolboxItem) -> BlockwireResult<Option<String>> {
        match item {
            ToolboxItem::Block { block_type, variable } => self
                .create_block_with_variable(block_type, variable.as_ref().map(|variable| variable.id.as_str()))
                .map(Some),
            ToolboxItem::Separator { .. } => Ok(None),
        }
    }

    /// Instantiate a registered block type. `variable_id` presets the
    /// variable picker, otherwise an existing variable of the picker's
    /// default type is reused or a new one is created.
    pub fn create_block_with_variable(&mut self, block_type: &str, variable_id: Option<&str>) -> BlockwireResult<String> {
        let definition = self
            .registry
            .read()
            .map_err(|_| BlockwireError::RegistryPoisoned)?
            .lookup(block_type)
            .ok_or_else(|| BlockwireError::UnknownBlockType(block_type.to_owned()))?;

        let block_id = nanoid!();
        let block = self.instantiate(&definition, variable_id);
        trace!("create block: {}, type: {}", block_id, block_type);
        self.blocks.insert(block_id.clone(), block);

        Ok(block_id)
    }

    fn instantiate(&mut self, definition: &BlockDefinition, variable_id: Option<&str>) -> BlockState {
        let mut inputs = BTreeMap::new();
        let mut fields = BTreeMap::new();

        for arg in definition.args() {
            match arg {
                BlockArg::FieldVariable {
                    name,
                    variable,
                    default_type,
                    ..
                } => {
                    let var_type = default_type.as_ref().map(ToString::to_string).unwrap_or_default();
                    let variable_id = self.bind_variable(variable_id, variable.as_deref(), &var_type);
                    fields.insert(
                        name.clone(),
                        FieldState {
                            name: name.clone(),
                            value: variable_id,
                            options: vec![],
                        },
                    );
                }
                BlockArg::FieldDropdown { name, options, value } => {
                    fields.insert(
                        name.clone(),
                        FieldState {
                            name: name.clone(),
                            value: value
                                .clone()
                                .or_else(|| options.first().map(|option| option.value.clone()))
                                .unwrap_or_default(),
                            options: options.clone(),
                        },
                    );
                }
                BlockArg::InputValue { name, check } => {
                    inputs.insert(
                        name.clone(),
                        InputState {
                            check: check
                                .as_ref()
                                .map(|check| check.iter().map(ToString::to_string).collect()),
                            statement: false,
                            target: None,
                        },
                    );
                }
                BlockArg::InputStatement { name } => {
                    inputs.insert(
                        name.clone(),
                        InputState {
                            check: None,
                            statement: true,
                            target: None,
                        },
                    );
                }
                BlockArg::FieldIcon { .. } | BlockArg::FieldLabel { .. } => {}
            }
        }

        let (has_output, output_check) = match &definition.output {
            BlockOutput::Statement => (false, None),
            BlockOutput::Untyped => (true, None),
            BlockOutput::Typed(tag) => (true, Some(vec![tag.to_string()])),
        };

        BlockState {
            block_type: definition.block_type.clone(),
            has_output,
            output_check,
            parent: None,
            inputs,
            fields,
            position: (0.0, 0.0),
        }
    }

    fn bind_variable(&mut self, preset: Option<&str>, name: Option<&str>, var_type: &str) -> String {
        if let Some(variable) = preset.and_then(|id| self.variable(id)) {
            return variable.id.clone();
        }
        if !var_type.is_empty() {
            if let Some(variable) = self.variables.iter().find(|variable| variable.var_type == var_type) {
                return variable.id.clone();
            }
        }

        let base = name.unwrap_or(DEFAULT_VARIABLE_NAME);
        let name = (1..)
            .map(|n| if n == 1 { base.to_owned() } else { format!("{base}{n}") })
            .find(|name| !self.variables.iter().any(|variable| &variable.name == name))
            .unwrap_or_else(|| base.to_owned());

        self.create_variable(&name, var_type, None).id
    }

    /// Plug `child`'s output into `input` of `parent`, as a user would.
    ///
    /// A child plugged elsewhere and a block already occupying `input` are
    /// unplugged first, each reported as a disconnect.
    pub fn connect(&mut self, child_id: &str, parent_id: &str, input: &str) -> BlockwireResult {
        let child = self
            .blocks
            .get(child_id)
            .ok_or_else(|| BlockwireError::BlockNotFound(child_id.to_owned()))?;
        let parent = self
            .blocks
            .get(parent_id)
            .ok_or_else(|| BlockwireError::BlockNotFound(parent_id.to_owned()))?;
        let slot = parent.inputs.get(input).ok_or_else(|| BlockwireError::InputNotFound {
            block: parent_id.to_owned(),
            input: input.to_owned(),
        })?;

        let compatible = match (&child.output_check, &slot.check) {
            (Some(output), Some(accepted)) => output.iter().any(|tag| accepted.contains(tag)),
            _ => true,
        };
        if child_id == parent_id || !child.has_output || slot.statement || !compatible {
            return Err(BlockwireError::IncompatibleConnection {
                child: child_id.to_owned(),
                parent: parent_id.to_owned(),
                input: input.to_owned(),
            });
        }

        let occupant = slot.target.clone();
        if child.parent.is_some() {
            self.unplug(child_id)?;
        }
        if let Some(occupant) = occupant.filter(|occupant| occupant != child_id) {
            self.unplug(&occupant)?;
        }

        if let Some(slot) = self
            .blocks
            .get_mut(parent_id)
            .and_then(|parent| parent.inputs.get_mut(input))
        {
            slot.target = Some(child_id.to_owned());
        }
        if let Some(child) = self.blocks.get_mut(child_id) {
            child.parent = Some(ParentLink {
                block: parent_id.to_owned(),
                input: input.to_owned(),
            });
        }

        self.dispatch(ConnectionEvent::connect(&self.id, child_id, parent_id));

        Ok(())
    }

    /// Pull `child` out of its parent, as a user would.
    pub fn unplug(&mut self, child_id: &str) -> BlockwireResult {
        let parent = self.detach(child_id)?;
        self.dispatch(ConnectionEvent::disconnect(&self.id, child_id, parent.block));

        Ok(())
    }

    /// Report `event` to every change listener. Nested reports made while
    /// the listeners run are dropped.
    pub fn dispatch(&mut self, event: ConnectionEvent) {
        if self.dispatching {
            debug!("drop nested change event: {:?}", event);
            return;
        }

        self.dispatching = true;
        let mut listeners = std::mem::take(&mut self.listeners);
        for (_, listener) in listeners.iter_mut() {
            listener(&mut *self, &event);
        }
        // keep listeners added while dispatching
        listeners.append(&mut self.listeners);
        self.listeners = listeners;
        self.dispatching = false;
    }

    fn detach(&mut self, child_id: &str) -> BlockwireResult<ParentLink> {
        let parent = self
            .blocks
            .get_mut(child_id)
            .ok_or_else(|| BlockwireError::BlockNotFound(child_id.to_owned()))?
            .parent
            .take()
            .ok_or_else(|| BlockwireError::AlreadyDisconnected(child_id.to_owned()))?;

        if let Some(slot) = self
            .blocks
            .get_mut(&parent.block)
            .and_then(|block| block.inputs.get_mut(&parent.input))
        {
            slot.target = None;
        }

        Ok(parent)
    }

    fn field_mut(&mut self, block_id: &str, name: &str) -> BlockwireResult<&mut FieldState> {
        self.blocks
            .get_mut(block_id)
            .ok_or_else(|| BlockwireError::BlockNotFound(block_id.to_owned()))?
            .fields
            .get_mut(name)
            .ok_or_else(|| BlockwireError::FieldNotFound {
                block: block_id.to_owned(),
                field: name.to_owned(),
            })
    }
}

impl WorkspaceAdapter for MemoryWorkspace {
    fn id(&self) -> &str {
        &self.id
    }

    fn get_block(&self, block_id: &str) -> Option<BlockSnapshot> {
        self.blocks.get(block_id).map(|block| block.snapshot(block_id))
    }

    fn create_variable(&mut self, name: &str, var_type: &str, id: Option<&str>) -> WorkspaceVariable {
        if let Some(variable) = self.variables.iter().find(|variable| variable.name == name) {
            return variable.clone();
        }

        let variable = WorkspaceVariable {
            id: id.map(ToOwned::to_owned).unwrap_or_else(|| nanoid!()),
            name: name.to_owned(),
            var_type: var_type.to_owned(),
        };
        trace!("create variable: {}, type: {}", name, var_type);
        self.variables.push(variable.clone());

        variable
    }

    fn all_variables(&self) -> Vec<WorkspaceVariable> {
        self.variables.clone()
    }

    fn set_variable_type(&mut self, variable_id: &str, var_type: &str) -> BlockwireResult {
        let variable = self
            .variables
            .iter_mut()
            .find(|variable| variable.id == variable_id)
            .ok_or_else(|| BlockwireError::VariableNotFound(variable_id.to_owned()))?;
        variable.var_type = var_type.to_owned();

        Ok(())
    }

    fn set_output_type(&mut self, block_id: &str, tag: &TypeTag) -> BlockwireResult {
        let block = self
            .blocks
            .get_mut(block_id)
            .ok_or_else(|| BlockwireError::BlockNotFound(block_id.to_owned()))?;
        block.has_output = true;
        block.output_check = Some(vec![tag.to_string()]);

        Ok(())
    }

    fn disconnect_output(&mut self, block_id: &str) -> BlockwireResult {
        self.detach(block_id).map(|_| ())
    }

    fn disconnect_input(&mut self, block_id: &str, input: &str) -> BlockwireResult {
        let target = self
            .input_target(block_id, input)
            .ok_or_else(|| BlockwireError::AlreadyDisconnected(format!("{block_id}.{input}")))?;

        self.detach(&target).map(|_| ())
    }

    fn input_target(&self, block_id: &str, input: &str) -> Option<String> {
        self.blocks.get(block_id)?.inputs.get(input)?.target.clone()
    }

    fn output_target(&self, block_id: &str) -> Option<String> {
        self.blocks.get(block_id)?.parent.as_ref().map(|parent| parent.block.clone())
    }

    fn move_by(&mut self, block_id: &str, dx: f64, dy: f64) -> BlockwireResult {
        let block = self
            .blocks
            .get_mut(block_id)
            .ok_or_else(|| BlockwireError::BlockNotFound(block_id.to_owned()))?;
        block.position = (block.position.0 + dx, block.position.1 + dy);

        Ok(())
    }

    fn get_field(&self, block_id: &str, name: &str) -> Option<FieldState> {
        self.blocks.get(block_id)?.fields.get(name).cloned()
    }

    fn set_field_value(&mut self, block_id: &str, name: &str, value: &str) -> BlockwireResult {
        self.field_mut(block_id, name)?.value = value.to_owned();
        Ok(())
    }

    fn replace_field_options(&mut self, block_id: &str, name: &str, options: Vec<DropdownOption>) -> BlockwireResult {
        self.field_mut(block_id, name)?.options = options;
        Ok(())
    }

    fn register_category_callback(&mut self, name: &str, callback: CategoryCallback) {
        self.categories.insert(name.to_owned(), callback);
    }

    fn remove_category_callback(&mut self, name: &str) -> bool {
        self.categories.remove(name).is_some()
    }

    fn add_change_listener(&mut self, listener: ChangeListener) -> String {
        let id = nanoid!();
        self.listeners.push((id.clone(), listener));
        id
    }

    fn remove_change_listener(&mut self, listener_id: &str) -> bool {
        let len = self.listeners.len();
        self.listeners.retain(|(id, _)| id != listener_id);
        self.listeners.len() != len
    }
}

impl Serialize for MemoryWorkspace {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("blocks", &self.blocks)?;
        map.serialize_entry("variables", &self.variables)?;
        map.end()
    }
}

#[cfg(test)]
mod test {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    fn workspace() -> MemoryWorkspace {
        let domain = DomainModel::from_json(
            r##"{
                "collections": [
                    { "id": "c1", "name": "People", "icon": "fa-user", "color": "#336699" },
                    { "id": "c2", "name": "Cars", "icon": "fa-car", "color": "#000000" }
                ],
                "linkTypes": [{ "name": "owns", "collectionIds": ["c1", "c2"] }]
            }"##,
        )
        .unwrap();
        let registry = BlockRegistry::shared(&EditorConfig::default());
        {
            let mut registry = registry.write().unwrap();
            registry.ensure_document_block("c1", &domain).unwrap();
            registry.ensure_document_block("c2", &domain).unwrap();
            registry.ensure_link_block(&domain.link_types[0], &domain).unwrap();
        }
        MemoryWorkspace::with_id("ws", registry)
    }

    #[test]
    fn create_block() {
        let mut ws = workspace();

        let getter = ws.create_block("variables_get_c1_document").unwrap();
        let block = ws.get_block(&getter).unwrap();
        assert_eq!(block.block_type, "variables_get_c1_document");
        assert_eq!(block.output_check, Some(vec!["c1_document".to_owned()]));
        assert!(!block.output_connected);

        let variable_id = ws.get_field(&getter, "VAR").unwrap().value;
        assert_eq!(ws.variable(&variable_id).unwrap().var_type, "c1_document");

        // the second getter reuses the variable of its type
        let other = ws.create_block("variables_get_c1_document").unwrap();
        assert_eq!(ws.get_field(&other, "VAR").unwrap().value, variable_id);

        let attribute = ws.create_block("get_attribute").unwrap();
        let field = ws.get_field(&attribute, "ATTR").unwrap();
        assert_eq!(field.value, "N/A");
        assert_eq!(field.options, vec![DropdownOption::new("?", "?")]);

        assert!(matches!(
            ws.create_block("math_number"),
            Err(BlockwireError::UnknownBlockType(_))
        ));
        assert_eq!(ws.block_count(), 3);
    }

    #[test]
    fn foreach_loops_get_distinct_variables() {
        let mut ws = workspace();

        let first = ws.create_block("foreach_document_array").unwrap();
        let second = ws.create_block("foreach_document_array").unwrap();
        let first = ws.get_field(&first, "VAR").unwrap().value;
        let second = ws.get_field(&second, "VAR").unwrap().value;

        assert_ne!(first, second);
        assert_eq!(ws.variable(&first).unwrap().name, "item");
        assert_eq!(ws.variable(&second).unwrap().name, "item2");
    }

    #[test]
    fn connect_checks_types() {
        let mut ws = workspace();

        let person = ws.create_block("variables_get_c1_document").unwrap();
        let link = ws.create_block("c1_c2_link").unwrap();
        let foreach = ws.create_block("foreach_document_array").unwrap();

        ws.connect(&person, &link, "NAME").unwrap();
        assert_eq!(ws.parent(&person), Some((link.clone(), "NAME".to_owned())));
        assert_eq!(ws.input_target(&link, "NAME"), Some(person.clone()));

        // link output is `unknown`, the link input only takes documents
        let other = ws.create_block("c1_c2_link").unwrap();
        assert!(matches!(
            ws.connect(&other, &link, "NAME"),
            Err(BlockwireError::IncompatibleConnection { .. })
        ));
        assert!(ws.connect(&foreach, &link, "NAME").is_err());
        assert!(ws.connect(&person, &foreach, "DO").is_err());
        assert!(ws.connect(&person, &person, "NAME").is_err());
        assert!(matches!(
            ws.connect(&person, &foreach, "MISSING"),
            Err(BlockwireError::InputNotFound { .. })
        ));
    }

    #[test]
    fn user_edits_are_reported() {
        let mut ws = workspace();
        let events = Rc::new(RefCell::new(vec![]));

        let recorded = events.clone();
        let listener = ws.add_change_listener(Box::new(move |_: &mut dyn WorkspaceAdapter, event: &ConnectionEvent| {
            recorded.borrow_mut().push(event.clone())
        }));

        let person = ws.create_block("variables_get_c1_document").unwrap();
        let car = ws.create_block("variables_get_c2_document").unwrap();
        let link = ws.create_block("c1_c2_link").unwrap();

        ws.connect(&person, &link, "NAME").unwrap();
        // replacing the occupant reports its removal first
        ws.connect(&car, &link, "NAME").unwrap();
        ws.unplug(&car).unwrap();
        assert!(matches!(ws.unplug(&car), Err(BlockwireError::AlreadyDisconnected(_))));

        assert_eq!(
            *events.borrow(),
            vec![
                ConnectionEvent::connect("ws", &person, &link),
                ConnectionEvent::disconnect("ws", &person, &link),
                ConnectionEvent::connect("ws", &car, &link),
                ConnectionEvent::disconnect("ws", &car, &link),
            ]
        );

        assert!(ws.remove_change_listener(&listener));
        assert!(!ws.remove_change_listener(&listener));
        ws.connect(&person, &link, "NAME").unwrap();
        assert_eq!(events.borrow().len(), 4);
    }

    #[test]
    fn nested_edits_are_not_reported() {
        let mut ws = workspace();
        let events = Rc::new(RefCell::new(vec![]));

        let recorded = events.clone();
        ws.add_change_listener(Box::new(move |ws: &mut dyn WorkspaceAdapter, event: &ConnectionEvent| {
            recorded.borrow_mut().push(event.clone());
            if event.new_parent_id.is_some() {
                ws.disconnect_output(&event.block_id).unwrap();
            }
        }));

        let person = ws.create_block("variables_get_c1_document").unwrap();
        let link = ws.create_block("c1_c2_link").unwrap();
        ws.connect(&person, &link, "NAME").unwrap();

        assert_eq!(*events.borrow(), vec![ConnectionEvent::connect("ws", &person, &link)]);
        assert_eq!(ws.parent(&person), None);

        ws.dispatching = true;
        ws.connect(&person, &link, "NAME").unwrap();
        assert_eq!(events.borrow().len(), 1);
    }

    #[test]
    fn programmatic_mutations() {
        let mut ws = workspace();

        let person = ws.create_block("variables_get_c1_document").unwrap();
        let link = ws.create_block("c1_c2_link").unwrap();

        assert!(matches!(
            ws.disconnect_input(&link, "NAME"),
            Err(BlockwireError::AlreadyDisconnected(_))
        ));
        ws.connect(&person, &link, "NAME").unwrap();
        assert_eq!(ws.output_target(&person), Some(link.clone()));
        ws.disconnect_input(&link, "NAME").unwrap();
        assert_eq!(ws.parent(&person), None);
        assert_eq!(ws.output_target(&person), None);

        let getter = ws.create_block("get_attribute").unwrap();
        ws.replace_field_options(&getter, "ATTR", vec![DropdownOption::new("Name", "a1")])
            .unwrap();
        assert_eq!(
            ws.get_field_options(&getter, "ATTR"),
            Some(vec![DropdownOption::new("Name", "a1")])
        );
        assert_eq!(ws.get_field_options(&getter, "MISSING"), None);

        ws.set_output_type(&link, &TypeTag::document_array("c2")).unwrap();
        assert_eq!(TypeTag::of(&ws.get_block(&link).unwrap()), TypeTag::document_array("c2"));

        ws.move_by(&link, 28.0, 28.0).unwrap();
        ws.move_by(&link, 2.0, -8.0).unwrap();
        assert_eq!(ws.position(&link), Some((30.0, 20.0)));

        assert!(matches!(
            ws.set_field_value(&link, "ATTR", "x"),
            Err(BlockwireError::FieldNotFound { .. })
        ));
        assert!(matches!(
            ws.set_variable_type("missing", "c1_document"),
            Err(BlockwireError::VariableNotFound(_))
        ));
    }

    #[test]
    fn variables() {
        let mut ws = workspace();

        let person = ws.create_variable("person", "c1_document", Some("v1"));
        assert_eq!(person.id, "v1");
        // names are unique, the existing variable is returned
        assert_eq!(ws.create_variable("person", "c2_document", None), person);
        assert_eq!(ws.all_variables(), vec![person]);

        ws.set_variable_type("v1", "c2_document").unwrap();
        assert_eq!(ws.variable("v1").unwrap().var_type, "c2_document");
    }

    #[test]
    fn serialize_workspace() {
        let mut ws = workspace();
        let attribute = ws.create_block("get_attribute").unwrap();

        let json = serde_json::to_value(&ws).unwrap();
        assert_eq!(json["id"], "ws");
        assert_eq!(json["blocks"][&attribute]["type"], "get_attribute");
        assert_eq!(json["blocks"][&attribute]["fields"]["ATTR"]["value"], "N/A");
        assert_eq!(json["blocks"][&attribute]["inputs"]["DOCUMENT"]["target"], serde_json::Value::Null);
    }
}
