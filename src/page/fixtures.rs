//! Concrete page and object types shared by the crate's tests.

use crate::datagram::{Datagram, DatagramIterator};
use crate::error::{PageError, Result};
use crate::page::CycleData;
use crate::persist::{same_object, ObjectRef, ReadContext, TypedObject, WriteContext};
use crate::types::{TypeHandle, TypeRegistry};
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub fn transform_type() -> TypeHandle {
    TypeRegistry::global().register_type("TransformState", None)
}

pub fn texture_stage_type() -> TypeHandle {
    TypeRegistry::global().register_type("TextureAttrib", None)
}

pub fn texture_type() -> TypeHandle {
    TypeRegistry::global().register_type("Texture", None)
}

/// A persisted object pages can point at
#[derive(Debug, PartialEq)]
pub struct Texture {
    pub name: String,
}

impl Texture {
    pub fn shared(name: &str) -> ObjectRef {
        Arc::new(Texture {
            name: name.to_string(),
        })
    }
}

impl TypedObject for Texture {
    fn type_handle(&self) -> TypeHandle {
        texture_type()
    }
}

/// A persisted object of some other type
#[derive(Debug)]
pub struct Material;

impl TypedObject for Material {
    fn type_handle(&self) -> TypeHandle {
        TypeRegistry::global().register_type("Material", None)
    }
}

/// Page with nothing to persist
#[derive(Debug, Default, Clone, PartialEq)]
pub struct EmptyPage;

impl CycleData for EmptyPage {
    fn make_copy(&self) -> Box<dyn CycleData> {
        Box::new(self.clone())
    }
}

/// Page whose `make_copy` returns the wrong type
#[derive(Debug, Default)]
pub struct WrongCopyPage;

impl CycleData for WrongCopyPage {
    fn make_copy(&self) -> Box<dyn CycleData> {
        Box::new(EmptyPage)
    }
}

/// Plain-value payload
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TransformPage {
    pub name: String,
    pub pos: [f32; 3],
    pub tags: Vec<u32>,
}

impl TransformPage {
    pub fn new(name: &str, pos: [f32; 3]) -> Self {
        Self {
            name: name.to_string(),
            pos,
            tags: Vec::new(),
        }
    }
}

impl CycleData for TransformPage {
    fn make_copy(&self) -> Box<dyn CycleData> {
        Box::new(self.clone())
    }

    fn write_datagram(&self, _writer: &mut dyn WriteContext, dg: &mut Datagram) {
        dg.add_string(&self.name);
        for v in self.pos {
            dg.add_f32(v);
        }
        dg.add_varint(self.tags.len() as u64);
        for &tag in &self.tags {
            dg.add_u32(tag);
        }
    }

    fn fillin(&mut self, scan: &mut DatagramIterator<'_>, _reader: &mut dyn ReadContext) -> Result<()> {
        self.name = scan.get_string()?;
        for v in self.pos.iter_mut() {
            *v = scan.get_f32()?;
        }
        let count = scan.get_varint()? as usize;
        if count > scan.remaining_size() / 4 {
            return Err(PageError::corruption(format!("{} tags cannot fit", count)));
        }
        self.tags = (0..count).map(|_| scan.get_u32()).collect::<Result<_>>()?;
        Ok(())
    }

    fn parent_type(&self) -> TypeHandle {
        transform_type()
    }

    fn output(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TransformPage({} @ {} {} {})",
            self.name, self.pos[0], self.pos[1], self.pos[2]
        )
    }
}

/// Page with a variable number of deferred pointers.
///
/// `complete_pointers` consumes one entry per stage, in stage order; the
/// stage count is whatever `fillin` read.
#[derive(Debug, Default, Clone)]
pub struct TextureStagesPage {
    pub stages: Vec<(String, Option<ObjectRef>)>,
}

impl TextureStagesPage {
    pub fn with_stage(mut self, name: &str, texture: Option<ObjectRef>) -> Self {
        self.stages.push((name.to_string(), texture));
        self
    }
}

impl PartialEq for TextureStagesPage {
    fn eq(&self, other: &Self) -> bool {
        self.stages.len() == other.stages.len()
            && self.stages.iter().zip(&other.stages).all(|(a, b)| {
                a.0 == b.0
                    && match (&a.1, &b.1) {
                        (None, None) => true,
                        (Some(x), Some(y)) => same_object(x, y),
                        _ => false,
                    }
            })
    }
}

impl CycleData for TextureStagesPage {
    fn make_copy(&self) -> Box<dyn CycleData> {
        Box::new(self.clone())
    }

    fn write_datagram(&self, writer: &mut dyn WriteContext, dg: &mut Datagram) {
        dg.add_varint(self.stages.len() as u64);
        for (name, texture) in &self.stages {
            dg.add_string(name);
            writer.write_pointer(dg, texture.as_ref());
        }
    }

    fn fillin(&mut self, scan: &mut DatagramIterator<'_>, reader: &mut dyn ReadContext) -> Result<()> {
        let count = scan.get_varint()? as usize;
        // Each stage needs at least a name length and a pointer id
        if count > scan.remaining_size() / 2 {
            return Err(PageError::corruption(format!("{} stages cannot fit", count)));
        }
        self.stages.clear();
        for _ in 0..count {
            let name = scan.get_string()?;
            reader.read_pointer(scan)?;
            self.stages.push((name, None));
        }
        Ok(())
    }

    fn complete_pointers(
        &mut self,
        p_list: &[Option<ObjectRef>],
        _reader: &mut dyn ReadContext,
    ) -> Result<usize> {
        let needed = self.stages.len();
        if p_list.len() < needed {
            return Err(PageError::PointerOverrun {
                consumed: needed,
                remaining: p_list.len(),
            });
        }
        for ((_, slot), target) in self.stages.iter_mut().zip(p_list) {
            if let Some(object) = target {
                if object.type_handle() != texture_type() {
                    return Err(PageError::type_mismatch("Texture", object.type_handle().name()));
                }
            }
            *slot = target.clone();
        }
        Ok(needed)
    }

    fn parent_type(&self) -> TypeHandle {
        texture_stage_type()
    }
}

/// Page that reports more pointers than it is given
#[derive(Debug, Default, Clone)]
pub struct GreedyPage;

impl CycleData for GreedyPage {
    fn make_copy(&self) -> Box<dyn CycleData> {
        Box::new(self.clone())
    }

    fn complete_pointers(
        &mut self,
        p_list: &[Option<ObjectRef>],
        _reader: &mut dyn ReadContext,
    ) -> Result<usize> {
        Ok(p_list.len() + 1)
    }
}

/// Page that uses the extra-data overloads.
///
/// On write, `extra` may be a `u8` scale applied to the stored value; on
/// read, `extra` may be a `usize` that receives the bytes consumed.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ScaledPage {
    pub value: u32,
}

impl CycleData for ScaledPage {
    fn make_copy(&self) -> Box<dyn CycleData> {
        Box::new(self.clone())
    }

    fn write_datagram(&self, _writer: &mut dyn WriteContext, dg: &mut Datagram) {
        dg.add_u32(self.value);
    }

    fn write_datagram_with(&self, _writer: &mut dyn WriteContext, dg: &mut Datagram, extra: &dyn Any) {
        let scale = extra.downcast_ref::<u8>().copied().unwrap_or(1) as u32;
        dg.add_u32(self.value * scale);
    }

    fn fillin(&mut self, scan: &mut DatagramIterator<'_>, _reader: &mut dyn ReadContext) -> Result<()> {
        self.value = scan.get_u32()?;
        Ok(())
    }

    fn fillin_with(
        &mut self,
        scan: &mut DatagramIterator<'_>,
        reader: &mut dyn ReadContext,
        extra: &mut dyn Any,
    ) -> Result<()> {
        let start = scan.position();
        self.fillin(scan, reader)?;
        if let Some(consumed) = extra.downcast_mut::<usize>() {
            *consumed += scan.position() - start;
        }
        Ok(())
    }
}

/// Page that counts its own destruction
#[derive(Debug, Clone)]
pub struct DropCounterPage {
    pub value: u32,
    pub drops: Arc<AtomicUsize>,
}

impl DropCounterPage {
    pub fn new(value: u32) -> (Self, Arc<AtomicUsize>) {
        let drops = Arc::new(AtomicUsize::new(0));
        (
            Self {
                value,
                drops: Arc::clone(&drops),
            },
            drops,
        )
    }
}

impl Drop for DropCounterPage {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

impl CycleData for DropCounterPage {
    fn make_copy(&self) -> Box<dyn CycleData> {
        Box::new(self.clone())
    }
}
