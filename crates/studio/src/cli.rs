//! Command-line options for the `designflow` binary.

use designflow_core::generation::GenerationRequest;

pub const USAGE: &str = "usage: designflow [<description>] --style <style> --color <color> \
[--lighting] [--reference <image-id>] [--json]";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOptions {
    pub description: Option<String>,
    pub style: Option<String>,
    pub color: Option<String>,
    pub lighting: bool,
    pub reference: Option<String>,
    pub json: bool,
}

impl CliOptions {
    pub fn to_request(&self) -> GenerationRequest {
        let mut request = GenerationRequest::new(
            self.description.clone().unwrap_or_default(),
            self.style.clone().unwrap_or_default(),
            self.color.clone().unwrap_or_default(),
            self.lighting,
        );
        if let Some(reference) = &self.reference {
            request = request.with_reference(reference.as_str());
        }
        request
    }
}

/// Parse arguments (without the program name). Repeated flags, unknown
/// flags and a missing style or color are usage errors.
pub fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--style" => set_once(&mut options.style, args.next())?,
            "--color" => set_once(&mut options.color, args.next())?,
            "--reference" => set_once(&mut options.reference, args.next())?,
            "--lighting" => {
                if options.lighting {
                    return Err(());
                }
                options.lighting = true;
            }
            "--json" => {
                if options.json {
                    return Err(());
                }
                options.json = true;
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => set_once(&mut options.description, Some(arg))?,
        }
    }

    if options.style.is_none() || options.color.is_none() {
        return Err(());
    }
    if options.description.is_none() && options.reference.is_none() {
        return Err(());
    }

    Ok(options)
}

fn set_once(slot: &mut Option<String>, value: Option<String>) -> Result<(), ()> {
    if slot.is_some() {
        return Err(());
    }
    *slot = Some(value.ok_or(())?);
    Ok(())
}
