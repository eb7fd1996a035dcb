use super::argb::*;
use crate::error::*;

///
/// A colour table that maps sample values (indexes) to non-premultiplied ARGB colours
///
/// Palettes are normally shared as `Arc<IndexPalette>`: the identity of the `Arc` is what filters use to
/// recognise a palette they've seen before.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexPalette {
    /// The ARGB value of each entry
    entries: Vec<u32>,

    /// The entry (if any) that is always fully transparent
    transparent_index: Option<usize>,
}

impl IndexPalette {
    ///
    /// Creates a palette from a list of ARGB entries
    ///
    pub fn new(entries: Vec<u32>) -> Result<Self> {
        if entries.is_empty() {
            return Err(PixelStreamError::configuration("a palette needs at least one entry"));
        }

        Ok(IndexPalette { entries, transparent_index: None })
    }

    ///
    /// Creates a palette from a list of RGB values, all of which are opaque
    ///
    pub fn from_rgb(rgb: impl IntoIterator<Item=u32>) -> Result<Self> {
        Self::new(rgb.into_iter().map(|rgb| rgb | 0xff000000).collect())
    }

    ///
    /// Marks one entry as fully transparent
    ///
    pub fn with_transparent_index(mut self, index: usize) -> Result<Self> {
        if index >= self.entries.len() {
            return Err(PixelStreamError::configuration(format!("transparent index {} is outside a palette of {} entries", index, self.entries.len())));
        }

        self.entries[index]     &= 0x00ffffff;
        self.transparent_index  = Some(index);

        Ok(self)
    }

    ///
    /// The number of entries in this palette
    ///
    #[inline]
    pub fn len(&self) -> usize { self.entries.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    #[inline]
    pub fn entries(&self) -> &[u32] { &self.entries }

    #[inline]
    pub fn transparent_index(&self) -> Option<usize> { self.transparent_index }

    ///
    /// True if any entry in this palette is not fully opaque
    ///
    pub fn has_alpha(&self) -> bool {
        self.entries.iter().any(|entry| (entry >> 24) != 0xff)
    }

    ///
    /// Retrieves the colour of a sample. Samples past the end of the palette are treated as transparent black
    ///
    #[inline]
    pub fn argb(&self, index: u32) -> u32 {
        self.entries.get(index as usize).copied().unwrap_or(0)
    }

    ///
    /// Finds the entry that is the closest match for an ARGB colour
    ///
    pub fn closest_index(&self, argb: u32) -> u32 {
        let target = argb_components(argb);

        let distance = |entry: u32| {
            let entry = argb_components(entry);
            entry.iter().zip(target.iter())
                .map(|(a, b)| { let diff = (*a as i32) - (*b as i32); diff*diff })
                .sum::<i32>()
        };

        let mut best_index      = 0;
        let mut best_distance   = i32::MAX;

        for (index, entry) in self.entries.iter().enumerate() {
            let entry_distance = distance(*entry);

            if entry_distance < best_distance {
                best_index      = index;
                best_distance   = entry_distance;

                if entry_distance == 0 { break; }
            }
        }

        best_index as u32
    }

    ///
    /// Creates a new palette by applying a function to every entry (the transparent index is preserved)
    ///
    pub fn map_entries(&self, map_entry: impl Fn(u32) -> u32) -> IndexPalette {
        let entries = self.entries.iter().map(|entry| map_entry(*entry)).collect();
        let mut mapped = IndexPalette { entries, transparent_index: self.transparent_index };

        if let Some(transparent) = self.transparent_index {
            mapped.entries[transparent] &= 0x00ffffff;
        }

        mapped
    }
}
