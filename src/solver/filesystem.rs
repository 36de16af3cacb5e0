use anyhow::{bail, Context};
use tracing::{debug, info, trace};

use super::Solver;
use crate::common::Solution;
use crate::config::Config;
use crate::stat::Stats;

const DISK_SIZE: u64 = 70_000_000;
const NEEDED_SPACE: u64 = 30_000_000;
const SMALL_DIRECTORY: u64 = 100_000;

#[derive(Debug, Clone)]
struct Directory {
    name: String,
    parent: Option<usize>,
    children: Vec<usize>,
    // Files directly inside, not in subdirectories.
    file_size: u64,
}

// Directory tree rebuilt from a terminal session; directories live in an
// arena and refer to each other by index.
pub struct FileSystem {
    directories: Vec<Directory>,
    // Total size per directory, subdirectories included.
    sizes: Vec<u64>,
    stats: Stats,
}

impl FileSystem {
    const ROOT: usize = 0;

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let mut directories = vec![Directory {
            name: "/".to_string(),
            parent: None,
            children: Vec::new(),
            file_size: 0,
        }];
        let mut cwd = Self::ROOT;

        for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
            trace!("{line}");
            if let Some(target) = line.strip_prefix("$ cd ") {
                cwd = match target {
                    "/" => Self::ROOT,
                    ".." => directories[cwd].parent.unwrap_or(Self::ROOT),
                    name => Self::child(&mut directories, cwd, name),
                };
            } else if line == "$ ls" {
                continue;
            } else if let Some(name) = line.strip_prefix("dir ") {
                Self::child(&mut directories, cwd, name);
            } else {
                let (size, _) = line
                    .split_once(' ')
                    .with_context(|| format!("bad listing line {line:?}"))?;
                let size: u64 = size
                    .parse()
                    .with_context(|| format!("bad file size in {line:?}"))?;
                directories[cwd].file_size += size;
            }
        }

        let sizes = Self::total_sizes(&directories);
        debug!("{} directories, {} bytes used", directories.len(), sizes[Self::ROOT]);
        Ok(FileSystem {
            directories,
            sizes,
            stats: Stats::default(),
        })
    }

    // Index of `name` under `parent`, created on first sight.
    fn child(directories: &mut Vec<Directory>, parent: usize, name: &str) -> usize {
        if let Some(&existing) = directories[parent]
            .children
            .iter()
            .find(|&&child| directories[child].name == name)
        {
            return existing;
        }
        let index = directories.len();
        directories.push(Directory {
            name: name.to_string(),
            parent: Some(parent),
            children: Vec::new(),
            file_size: 0,
        });
        directories[parent].children.push(index);
        index
    }

    // Children always come after their parent in the arena, so one reverse
    // sweep folds every subtree into its parent.
    fn total_sizes(directories: &[Directory]) -> Vec<u64> {
        let mut sizes: Vec<u64> = directories.iter().map(|d| d.file_size).collect();
        for (index, directory) in directories.iter().enumerate().rev() {
            if let Some(parent) = directory.parent {
                sizes[parent] += sizes[index];
            }
        }
        sizes
    }

    pub fn used_space(&self) -> u64 {
        self.sizes[Self::ROOT]
    }

    pub fn small_directories_total(&self) -> u64 {
        self.sizes
            .iter()
            .filter(|&&size| size <= SMALL_DIRECTORY)
            .sum()
    }

    pub fn directory_to_delete(&self) -> anyhow::Result<u64> {
        let free = DISK_SIZE.saturating_sub(self.used_space());
        let missing = NEEDED_SPACE.saturating_sub(free);
        let Some(&size) = self.sizes.iter().filter(|&&size| size >= missing).min() else {
            bail!("no directory frees {missing} bytes");
        };
        Ok(size)
    }
}

impl Solver for FileSystem {
    fn solve(&mut self, _config: &Config) -> anyhow::Result<Solution> {
        let part_one = self.small_directories_total();
        let part_two = self.directory_to_delete()?;
        info!(
            "file system: {part_one} bytes in small directories, delete {part_two} bytes of {} directories",
            self.directories.len()
        );
        Ok(Solution {
            part_one: part_one as i64,
            part_two: part_two as i64,
        })
    }

    fn stats(&self) -> &Stats {
        &self.stats
    }
}
