use std::io::{BufRead, Write};

use crate::models::{PartCategory, SearchScope};
use crate::repository::PartRepository;
use crate::utils::{AppError, Result};

const INVALID_OPTION: &str = "Invalid option.";

/// Menu-driven terminal browser over the stored listings.
pub struct PartBrowser<'a> {
    repository: &'a PartRepository,
}

/// Writes the prompt and reads one trimmed line. `None` at end of input.
fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, text: &str) -> Result<Option<String>> {
    write!(output, "{}", text)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

impl<'a> PartBrowser<'a> {
    pub fn new(repository: &'a PartRepository) -> Self {
        Self { repository }
    }

    pub async fn run<R: BufRead, W: Write>(&self, input: &mut R, output: &mut W) -> Result<()> {
        match self.repository.require_schema().await {
            Ok(()) => {}
            Err(e @ AppError::SchemaNotInitialized { .. }) => {
                writeln!(output, "{}", e)?;
                return Ok(());
            }
            Err(e) => return Err(e),
        }

        writeln!(output, "\n==== PC Part Tracker ====")?;
        loop {
            for (index, category) in PartCategory::ALL.iter().enumerate() {
                writeln!(output, "{}. View {}", index + 1, category.plural())?;
            }
            writeln!(output, "{}. Exit", PartCategory::ALL.len() + 1)?;

            let Some(choice) = prompt(input, output, "Enter choice: ")? else {
                break;
            };

            let category = match choice.as_str() {
                "1" => PartCategory::Cpu,
                "2" => PartCategory::Gpu,
                "3" => PartCategory::Motherboard,
                "4" => break,
                _ => {
                    writeln!(output, "{}", INVALID_OPTION)?;
                    continue;
                }
            };

            if !self.category_menu(category, input, output).await? {
                break;
            }
        }

        Ok(())
    }

    /// Returns `false` once input is exhausted.
    async fn category_menu<R: BufRead, W: Write>(
        &self,
        category: PartCategory,
        input: &mut R,
        output: &mut W,
    ) -> Result<bool> {
        loop {
            writeln!(output, "1. Display all {}", category.plural())?;
            writeln!(output, "2. Search for a {} by name", category)?;
            writeln!(output, "3. Back")?;

            let Some(choice) = prompt(input, output, "Enter choice: ")? else {
                return Ok(false);
            };

            match choice.as_str() {
                "1" => self.print_records(category, None, output).await?,
                "2" => {
                    let Some(name) = prompt(input, output, &format!("Enter {} name: ", category))? else {
                        return Ok(false);
                    };
                    self.print_records(category, Some(&name), output).await?;
                }
                "3" => return Ok(true),
                _ => writeln!(output, "{}", INVALID_OPTION)?,
            }
        }
    }

    async fn print_records<W: Write>(&self, category: PartCategory, name: Option<&str>, output: &mut W) -> Result<()> {
        let records = self
            .repository
            .search(category, name, SearchScope::AllObservations)
            .await?;

        if records.is_empty() {
            writeln!(output, "No matching {}.", category.plural())?;
        }
        for record in &records {
            writeln!(output, "{}", record)?;
        }
        Ok(())
    }
}
