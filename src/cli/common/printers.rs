// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Pretty printers for reporting information as trees of log lines.

use std::{borrow::Cow, sync::Mutex};

const VERTICAL: char = '│';
const UP_AND_RIGHT: char = '└';
const VERTICAL_AND_RIGHT: char = '├';

type Block = Vec<Cow<'static, str>>;

lazy_static::lazy_static! {
    static ref WARNINGS: Mutex<Vec<Block>> = Mutex::new(vec![]);
}

/// Lay out blocks of lines under a title. The first line of each block gets a
/// branch; the last block's branch closes the tree.
fn tree_lines(blocks: &[Block]) -> Vec<String> {
    let num_blocks = blocks.len();
    let mut lines = vec![];
    for (i_block, block) in blocks.iter().enumerate() {
        let last_block = i_block + 1 == num_blocks;
        for (i_line, line) in block.iter().enumerate() {
            let symbol = match (i_line, last_block && block.len() == 1) {
                (0, true) => UP_AND_RIGHT,
                (0, false) => VERTICAL_AND_RIGHT,
                _ => VERTICAL,
            };
            lines.push(format!("{symbol} {line}"));
        }
    }
    lines
}

/// Collects information and prints it in one go, at info level.
pub(crate) struct InfoPrinter {
    title: Cow<'static, str>,
    blocks: Vec<Block>,
}

impl InfoPrinter {
    pub(crate) fn new(title: Cow<'static, str>) -> Self {
        Self {
            title,
            blocks: vec![],
        }
    }

    pub(crate) fn push_line(&mut self, line: Cow<'static, str>) {
        self.blocks.push(vec![line]);
    }

    pub(crate) fn push_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub(crate) fn display(self) {
        log::info!("{}", console::style(self.title).bold());
        for line in tree_lines(&self.blocks) {
            log::info!("{line}");
        }
        log::info!("");
    }
}

pub(crate) trait Warn {
    fn warn(self);
}

impl Warn for &'static str {
    fn warn(self) {
        push_warning(vec![self.into()]);
    }
}

impl Warn for String {
    fn warn(self) {
        push_warning(vec![self.into()]);
    }
}

impl Warn for Vec<Cow<'static, str>> {
    fn warn(self) {
        push_warning(self);
    }
}

fn push_warning(block: Block) {
    match WARNINGS.lock() {
        Ok(mut w) => w.push(block),
        Err(poisoned) => poisoned.into_inner().push(block),
    }
}

/// Print out any warnings collected while running a subcommand, then forget
/// them.
pub(crate) fn display_warnings() {
    let blocks = match WARNINGS.lock() {
        Ok(mut w) => std::mem::take(&mut *w),
        Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
    };
    if blocks.is_empty() {
        return;
    }
    log::warn!("{}", console::style("Warnings").bold());
    for line in tree_lines(&blocks) {
        log::warn!("{line}");
    }
    log::warn!("");
}
