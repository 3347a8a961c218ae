use crate::domain::model::{CatalogItem, ItemId};
use crate::domain::ports::ComparisonObserver;
use crate::utils::error::{FinderError, Result};
use std::fmt;

pub const COMPARISON_CAPACITY: usize = 3;

/// Smallest selection worth showing side by side.
pub const COMPARISON_MINIMUM: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Added,
    Removed,
}

/// Bounded, insertion-ordered set of items picked for comparison.
pub struct ComparisonSelector {
    selected: Vec<ItemId>,
    observer: Option<Box<dyn ComparisonObserver>>,
}

impl fmt::Debug for ComparisonSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComparisonSelector")
            .field("selected", &self.selected)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl Default for ComparisonSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl ComparisonSelector {
    pub fn new() -> Self {
        Self {
            selected: Vec::with_capacity(COMPARISON_CAPACITY),
            observer: None,
        }
    }

    pub fn with_observer(observer: impl ComparisonObserver + 'static) -> Self {
        let mut selector = Self::new();
        selector.set_observer(observer);
        selector
    }

    pub fn set_observer(&mut self, observer: impl ComparisonObserver + 'static) {
        self.observer = Some(Box::new(observer));
    }

    pub fn selection(&self) -> &[ItemId] {
        &self.selected
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.selected.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.selected.len() >= COMPARISON_CAPACITY
    }

    /// True when enough items are selected to open the comparison view.
    pub fn is_ready(&self) -> bool {
        (COMPARISON_MINIMUM..=COMPARISON_CAPACITY).contains(&self.selected.len())
    }

    /// Removes `id` if present, otherwise appends it. A full set rejects the
    /// addition with [`FinderError::ComparisonFull`] and stays unchanged.
    pub fn toggle(&mut self, id: ItemId) -> Result<Toggled> {
        let outcome = if let Some(position) = self.selected.iter().position(|s| *s == id) {
            self.selected.remove(position);
            Toggled::Removed
        } else if self.is_full() {
            tracing::info!(
                "🚫 Comparison is full ({}/{}), rejected university {}",
                self.selected.len(),
                COMPARISON_CAPACITY,
                id
            );
            return Err(FinderError::ComparisonFull {
                capacity: COMPARISON_CAPACITY,
            });
        } else {
            self.selected.push(id);
            Toggled::Added
        };

        tracing::debug!(?outcome, selection = ?self.selected, "comparison toggled");
        self.notify();
        Ok(outcome)
    }

    pub fn clear(&mut self) {
        if self.selected.is_empty() {
            return;
        }
        self.selected.clear();
        self.notify();
    }

    /// Looks the selection up in `items`, keeping selection order. Ids that are
    /// not in `items` are skipped.
    pub fn resolve<'a, I>(&self, items: I) -> Vec<&'a CatalogItem>
    where
        I: IntoIterator<Item = &'a CatalogItem>,
    {
        let items: Vec<&CatalogItem> = items.into_iter().collect();
        self.selected
            .iter()
            .filter_map(|id| items.iter().find(|item| item.id == *id).copied())
            .collect()
    }

    fn notify(&mut self) {
        if let Some(observer) = self.observer.as_mut() {
            observer.comparison_changed(&self.selected);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonRow {
    pub label: &'static str,
    pub values: Vec<String>,
}

/// Side-by-side view of the selected items, one column per item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonTable {
    pub headers: Vec<String>,
    pub rows: Vec<ComparisonRow>,
}

impl ComparisonTable {
    pub fn build(items: &[&CatalogItem]) -> Self {
        Self {
            headers: column(items, |i| i.name.clone()),
            rows: vec![
                ComparisonRow {
                    label: "Location",
                    values: column(items, CatalogItem::location),
                },
                ComparisonRow {
                    label: "Degree Level",
                    values: column(items, |i| i.degree_level.as_catalog_str().to_string()),
                },
                ComparisonRow {
                    label: "Tuition Fee (per year)",
                    values: column(items, |i| format_fee(i.tuition_fee)),
                },
                ComparisonRow {
                    label: "Required GPA",
                    values: column(items, |i| i.required_gpa.to_string()),
                },
                ComparisonRow {
                    label: "Required IELTS",
                    values: column(items, |i| i.required_ielts.to_string()),
                },
                ComparisonRow {
                    label: "World Ranking",
                    values: column(items, |i| format!("#{}", i.ranking)),
                },
            ],
        }
    }
}

fn column(items: &[&CatalogItem], cell: impl Fn(&CatalogItem) -> String) -> Vec<String> {
    items.iter().map(|&item| cell(item)).collect()
}

impl fmt::Display for ComparisonTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label_width = self
            .rows
            .iter()
            .map(|row| row.label.len())
            .max()
            .unwrap_or(0)
            .max("Criteria".len());
        let widths: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.values.get(idx))
                    .map(String::len)
                    .chain(std::iter::once(header.len()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        write!(f, "{:<label_width$}", "Criteria")?;
        for (header, width) in self.headers.iter().zip(&widths) {
            write!(f, " | {:<width$}", header, width = *width)?;
        }
        writeln!(f)?;

        for row in &self.rows {
            write!(f, "{:<label_width$}", row.label)?;
            for (value, width) in row.values.iter().zip(&widths) {
                write!(f, " | {:<width$}", value, width = *width)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Whole-dollar amount with thousands separators, e.g. `$52,000`.
pub fn format_fee(fee: f64) -> String {
    let digits = (fee.round() as u64).to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("${}", grouped)
}
