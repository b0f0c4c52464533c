//! Lutz single-pass connected component labeling.
//!
//! Only one row of per-column markers is kept. A marker describes how the run
//! of the previous row that starts or ends at that column relates to its
//! group:
//!
//! - `Start`: first run of a group in the row above.
//! - `StartSecondary`: a later run of a group already started in that row.
//! - `Finish`: end of the last run of a group section.
//! - `FinishSecondary`: end of a run with more runs of the group to follow.
//!
//! Groups that may still continue below sit in `incomplete`, keyed by the
//! column of their first run. Groups being extended on the current row live
//! on `group_stack`, and `section_stack` saves the section state of each
//! enclosing group while a nested one is open.

use std::borrow::Borrow;
use std::collections::BTreeMap;

use super::Segmentation;
use crate::error::{Error, Result};
use crate::pixel_group::{GroupId, Pixel, PixelGroup, PropertyMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    None,
    Start,
    StartSecondary,
    Finish,
    FinishSecondary,
}

/// State of the group section at the current column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    /// No pending runs of the group in the row above.
    Complete,
    /// More runs of the group follow in the row above.
    Incomplete,
    /// Inside a run of the row above.
    Object,
}

/// Group under construction.
#[derive(Debug)]
struct OpenGroup {
    /// Column of the group's first run on the current row.
    start: Option<usize>,
    /// Column just past the group's latest closed run on the current row.
    end: Option<usize>,
    pixels: Vec<Pixel>,
}

impl OpenGroup {
    fn starting_at(x: usize) -> Self {
        Self {
            start: Some(x),
            end: None,
            pixels: Vec::new(),
        }
    }
}

fn inconsistency(row: usize, column: usize, reason: &'static str) -> Error {
    Error::MarkerInconsistency {
        row,
        column,
        reason,
    }
}

pub(super) struct LutzScanner<'a, G> {
    segmentation: &'a Segmentation,
    on_group: G,
    row: usize,
    width: Option<usize>,
    marker: Vec<Marker>,
    section: Section,
    in_run: bool,
    section_stack: Vec<Section>,
    group_stack: Vec<OpenGroup>,
    incomplete: BTreeMap<usize, OpenGroup>,
    next_id: u64,
    object_pixels: usize,
}

impl<'a, G> LutzScanner<'a, G>
where
    G: FnMut(PixelGroup) -> anyhow::Result<()>,
{
    pub(super) fn new(segmentation: &'a Segmentation, on_group: G) -> Self {
        Self {
            segmentation,
            on_group,
            row: 0,
            width: None,
            marker: Vec::new(),
            section: Section::Complete,
            in_run: false,
            section_stack: Vec::new(),
            group_stack: Vec::new(),
            incomplete: BTreeMap::new(),
            next_id: 1,
            object_pixels: 0,
        }
    }

    pub(super) fn rows(&self) -> usize {
        self.row
    }

    pub(super) fn width(&self) -> usize {
        self.width.unwrap_or(0)
    }

    pub(super) fn groups_emitted(&self) -> usize {
        (self.next_id - 1) as usize
    }

    pub(super) fn object_pixels(&self) -> usize {
        self.object_pixels
    }

    /// Consume one row, followed by a virtual non-object pixel that closes
    /// any run touching the right edge.
    pub(super) fn scan_row<R>(&mut self, row: R) -> Result<()>
    where
        R: IntoIterator,
        R::Item: Borrow<f32>,
    {
        let y = self.row;
        self.section = Section::Complete;
        self.in_run = false;

        let mut values = row.into_iter();
        let mut x = 0;
        loop {
            match values.next() {
                Some(value) => {
                    if let Some(width) = self.width {
                        if x >= width {
                            return Err(Error::RowLengthMismatch {
                                row: y,
                                expected: width,
                                actual: x + 1 + values.count(),
                            });
                        }
                    }
                    self.step(x, Some(*value.borrow()))?;
                    x += 1;
                }
                None => {
                    match self.width {
                        None => self.width = Some(x),
                        Some(width) if width != x => {
                            return Err(Error::RowLengthMismatch {
                                row: y,
                                expected: width,
                                actual: x,
                            });
                        }
                        Some(_) => {}
                    }
                    self.step(x, None)?;
                    break;
                }
            }
        }

        self.row += 1;
        Ok(())
    }

    /// Emit the groups still waiting for rows that will never come, in
    /// ascending order of their start column.
    pub(super) fn finish(&mut self) -> Result<()> {
        let remaining = std::mem::take(&mut self.incomplete);
        for (_, group) in remaining {
            self.publish(group)?;
        }
        Ok(())
    }

    /// Process column `x` of the current row. `None` is the sentinel pixel.
    fn step(&mut self, x: usize, value: Option<f32>) -> Result<()> {
        let y = self.row;
        if x == self.marker.len() {
            self.marker.push(Marker::None);
        }
        let last_marker = std::mem::replace(&mut self.marker[x], Marker::None);
        let in_object = value.is_some_and(|v| (self.segmentation.threshold)(x, y, v));

        if in_object && !self.in_run {
            self.in_run = true;
            if self.section == Section::Object {
                // The run touches a run of the row above.
                let group = self.top_group(x)?;
                let marker = if group.start.is_none() {
                    group.start = Some(x);
                    Marker::Start
                } else {
                    Marker::StartSecondary
                };
                self.marker[x] = marker;
            } else {
                self.section_stack.push(self.section);
                self.section = Section::Complete;
                self.group_stack.push(OpenGroup::starting_at(x));
                self.marker[x] = Marker::Start;
            }
        }

        match last_marker {
            Marker::None => {}
            Marker::Start => {
                self.section_stack.push(self.section);
                let mut group = self
                    .incomplete
                    .remove(&x)
                    .ok_or_else(|| inconsistency(y, x, "no incomplete group starts here"))?;
                if self.in_run {
                    self.top_group(x)?.pixels.append(&mut group.pixels);
                } else {
                    self.section_stack.push(Section::Complete);
                    group.start = None;
                    group.end = None;
                    self.group_stack.push(group);
                }
                self.section = Section::Object;
            }
            Marker::StartSecondary => {
                if self.in_run && self.section == Section::Complete {
                    // The current run was opened as a new group but belongs
                    // to the enclosing one.
                    self.pop_section(x)?;
                    let mut joined = self.pop_group(x)?;
                    let group = self.top_group(x)?;
                    group.pixels.append(&mut joined.pixels);
                    let relabel = if group.start.is_none() {
                        group.start = joined.start;
                        None
                    } else {
                        joined.start
                    };
                    if let Some(start) = relabel {
                        self.marker[start] = Marker::StartSecondary;
                    }
                }
                self.section = Section::Object;
            }
            Marker::FinishSecondary => {
                self.section = Section::Incomplete;
            }
            Marker::Finish => {
                self.section = self.pop_section(x)?;
                if !self.in_run && self.section == Section::Complete {
                    let group = self.pop_group(x)?;
                    match group.start {
                        None => self.publish(group)?,
                        Some(start) => {
                            let end = group
                                .end
                                .ok_or_else(|| inconsistency(y, x, "finished section has no end"))?;
                            self.marker[end] = Marker::Finish;
                            self.park(x, start, group)?;
                        }
                    }
                    self.section = self.pop_section(x)?;
                }
            }
        }

        if in_object {
            let pixel = self.make_pixel(x, y, value.unwrap_or_default());
            self.top_group(x)?.pixels.push(pixel);
            self.object_pixels += 1;
        } else if self.in_run {
            self.in_run = false;
            if self.section != Section::Complete {
                self.marker[x] = Marker::FinishSecondary;
                self.top_group(x)?.end = Some(x);
            } else {
                self.section = self.pop_section(x)?;
                self.marker[x] = Marker::Finish;
                let group = self.pop_group(x)?;
                let start = group
                    .start
                    .ok_or_else(|| inconsistency(y, x, "closed run has no start"))?;
                self.park(x, start, group)?;
            }
        }

        Ok(())
    }

    fn make_pixel(&self, x: usize, y: usize, value: f32) -> Pixel {
        let properties: PropertyMap = self
            .segmentation
            .pixel_properties
            .iter()
            .map(|(name, f)| (name.clone(), f(x, y)))
            .collect();
        Pixel::with_properties(x, y, value, properties)
    }

    fn top_group(&mut self, x: usize) -> Result<&mut OpenGroup> {
        let row = self.row;
        self.group_stack
            .last_mut()
            .ok_or_else(|| inconsistency(row, x, "no open group"))
    }

    fn pop_group(&mut self, x: usize) -> Result<OpenGroup> {
        let row = self.row;
        self.group_stack
            .pop()
            .ok_or_else(|| inconsistency(row, x, "group stack underflow"))
    }

    fn pop_section(&mut self, x: usize) -> Result<Section> {
        let row = self.row;
        self.section_stack
            .pop()
            .ok_or_else(|| inconsistency(row, x, "section stack underflow"))
    }

    /// Keep a group whose section closed on this row until the next row
    /// reaches its start column.
    fn park(&mut self, x: usize, start: usize, group: OpenGroup) -> Result<()> {
        if self.incomplete.insert(start, group).is_some() {
            return Err(inconsistency(self.row, x, "two incomplete groups share a start column"));
        }
        Ok(())
    }

    fn publish(&mut self, group: OpenGroup) -> Result<()> {
        let id = GroupId::new(self.next_id);
        self.next_id += 1;
        let group = PixelGroup::new(id, group.pixels, &self.segmentation.group_properties);
        (self.on_group)(group)?;
        Ok(())
    }
}
