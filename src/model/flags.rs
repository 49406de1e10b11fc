use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// `access_flags` of classes, fields and methods.
    ///
    /// Some bits mean different things depending on where they appear (`VOLATILE` on a field
    /// is `BRIDGE` on a method), unknown bits are kept as read.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct AccessFlags: u32 {
        const PUBLIC = 0x1;
        const PRIVATE = 0x2;
        const PROTECTED = 0x4;
        const STATIC = 0x8;
        const FINAL = 0x10;
        const SYNCHRONIZED = 0x20;
        const VOLATILE = 0x40;
        const BRIDGE = 0x40;
        const TRANSIENT = 0x80;
        const VARARGS = 0x80;
        const NATIVE = 0x100;
        const INTERFACE = 0x200;
        const ABSTRACT = 0x400;
        const STRICT = 0x800;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
        const CONSTRUCTOR = 0x10000;
        const DECLARED_SYNCHRONIZED = 0x20000;
    }
}

impl AccessFlags
{
    pub fn from_raw(raw: u32) -> Self
    {
        AccessFlags::from_bits_retain(raw)
    }

    /// Interfaces and abstract classes are both treated as interfaces by the loader.
    pub fn is_interface_like(&self) -> bool
    {
        self.intersects(AccessFlags::INTERFACE | AccessFlags::ABSTRACT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_bits_survive() {
        let f = AccessFlags::from_raw(0x8000_0009);
        assert!(f.contains(AccessFlags::PUBLIC | AccessFlags::STATIC));
        assert_eq!(f.bits(), 0x8000_0009);
    }

    #[test]
    fn interface_like() {
        assert!(AccessFlags::from_raw(0x601).is_interface_like());
        assert!(AccessFlags::from_raw(0x401).is_interface_like());
        assert!(!AccessFlags::from_raw(0x11).is_interface_like());
    }
}
