use crate::{
    errors::ShapeError,
    model::{self, RAM_COMPONENT_KIND},
    schema::Value,
    schematic::shape,
    Error, Schematic,
};
use tracing::debug;

/// Widens the word size of the two RAM components of an architecture: a
/// small register file and a large program memory.
///
/// Both RAMs are moved to the end of the component list, register file
/// first, so that they are initialised after everything else in the
/// schematic.
///
/// ```rust,no_run
/// use tcsave::{RamPatch, Schematic};
/// # let data: Vec<u8> = Vec::new();
/// let mut schematic = Schematic::from_slice(&data)?;
/// RamPatch::default().apply(&mut schematic)?;
/// let patched = schematic.to_vec()?;
/// # Ok::<(), tcsave::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RamPatch {
    /// Buffer size identifying the register file
    pub register_file_size: i64,

    /// Word size given to the register file
    pub register_word_size: i64,

    /// Buffer size identifying the program memory
    pub program_size: i64,

    /// Word size given to the program memory
    pub program_word_size: i64,
}

impl Default for RamPatch {
    fn default() -> Self {
        RamPatch {
            register_file_size: 256,
            register_word_size: 16,
            program_size: 65536,
            program_word_size: 32,
        }
    }
}

impl RamPatch {
    /// Patch the schematic in place. The schematic is left untouched when it
    /// does not have exactly the expected pair of RAMs.
    pub fn apply(&self, schematic: &mut Schematic) -> Result<(), Error> {
        let components = schematic.components_mut()?;

        let mut rams = Vec::new();
        for (index, component) in components.iter().enumerate() {
            let kind = component_field(component, "component_kind")?;
            if kind == RAM_COMPONENT_KIND as i64 {
                rams.push((component_field(component, "buffer_size")?, index));
            }
        }

        if rams.len() != 2 {
            return Err(Error::from(ShapeError::ComponentCount {
                kind: RAM_COMPONENT_KIND,
                expected: 2,
                found: rams.len(),
            }));
        }

        rams.sort_unstable();
        let (register_size, register_index) = rams[0];
        let (program_size, program_index) = rams[1];

        if register_size != self.register_file_size {
            return Err(Error::from(ShapeError::BufferSize {
                expected: self.register_file_size,
                found: register_size,
            }));
        }

        if program_size != self.program_size {
            return Err(Error::from(ShapeError::BufferSize {
                expected: self.program_size,
                found: program_size,
            }));
        }

        debug!(
            "moving register file (component {}) and program (component {}) to the end",
            register_index, program_index
        );

        // Remove the later one first so the other index stays valid
        let (mut register, mut program) = if register_index > program_index {
            let register = components.remove(register_index);
            (register, components.remove(program_index))
        } else {
            let program = components.remove(program_index);
            (components.remove(register_index), program)
        };

        set_word_size(&mut register, self.register_word_size)?;
        set_word_size(&mut program, self.program_word_size)?;
        components.push(register);
        components.push(program);
        Ok(())
    }
}

fn component_field(component: &Value, field: &'static str) -> Result<i64, Error> {
    component
        .as_record()
        .and_then(|record| record.get(field))
        .and_then(Value::as_i64)
        .ok_or_else(|| shape(model::COMPONENT, field, "an integer"))
}

fn set_word_size(component: &mut Value, word_size: i64) -> Result<(), Error> {
    let record = component
        .as_record_mut()
        .ok_or_else(|| shape(model::SCHEMATIC, "components", "a list of records"))?;
    record.set("word_size", word_size);
    Ok(())
}

/// Decode a schematic file, apply the default [RamPatch], and encode it
/// again
pub fn fix_rams(data: &[u8]) -> Result<Vec<u8>, Error> {
    let mut schematic = Schematic::from_slice(data)?;
    RamPatch::default().apply(&mut schematic)?;
    schematic.to_vec()
}
