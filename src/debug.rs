//! Multi-line renderings of the resolution inputs, logged at debug level

use crate::filter::DependencySet;
use crate::module::Candidate;
use crate::path::FileSet;
use crate::project::Artifact;
use std::path::{Path, PathBuf};

fn braced<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let items: Vec<String> = items.into_iter().map(|s| s.as_ref().to_string()).collect();
    format!("{{ {} }}", items.join(", "))
}

fn labelled_list(out: &mut String, label: &str, items: &[String]) {
    out.push('\n');
    out.push_str(label);
    out.push(':');
    if !items.is_empty() {
        out.push('\n');
        out.push_str(&items.join("\n"));
    }
}

pub fn artifact_set_debug_info(artifacts: &[&Artifact]) -> String {
    let lines: Vec<String> = artifacts
        .iter()
        .map(|a| {
            let file = a
                .path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            format!(
                "{} - {}",
                a.coordinates.as_deref().unwrap_or("-"),
                file
            )
        })
        .collect();
    format!("\nARTIFACTS\n{}", lines.join("\n"))
}

pub fn path_elements_debug_info(title: &str, elements: &[PathBuf]) -> String {
    let lines: Vec<String> = elements.iter().map(|p| p.display().to_string()).collect();
    format!("\n{}\n{}", title, lines.join("\n"))
}

/// `root` is the resolved directory of the set.
pub fn file_set_debug_info(title: &str, set: &FileSet, root: &Path, data: &str) -> String {
    let mut out = format!(
        "\n{}\ndirectory: {}\nfollowSymlinks: {}\nuseDefaultExcludes: {}",
        title,
        root.display(),
        set.follow_symlinks,
        set.use_default_excludes
    );
    labelled_list(&mut out, "includes", &set.includes);
    labelled_list(&mut out, "excludes", &set.excludes);
    out.push_str("\ndata:\n");
    out.push_str(data);
    out
}

pub fn dependency_set_debug_info(title: &str, set: &DependencySet, data: &str) -> String {
    let mut out = format!(
        "\n{}\nincludeoutput: {}\nexcludeautomatic: {}",
        title, set.include_output, set.exclude_automatic
    );
    labelled_list(&mut out, "includes", &set.includes);
    labelled_list(&mut out, "includenames", &set.include_names);
    labelled_list(&mut out, "excludes", &set.excludes);
    labelled_list(&mut out, "excludenames", &set.exclude_names);
    out.push_str("\ndata:\n");
    out.push_str(data);
    out
}

/// Verdict, location and full descriptor of one candidate.
pub fn dependency_debug_info(candidate: &Candidate, included: bool) -> String {
    let mut out = format!(
        "\nincluded: {}\nfile: {}\npath: {}",
        included,
        candidate.file_name(),
        candidate.path.display()
    );
    let Some(descriptor) = &candidate.descriptor else {
        return out;
    };

    let requires: Vec<String> = descriptor
        .requires
        .iter()
        .map(|r| {
            format!(
                "{} : {}",
                r.name,
                braced(r.modifiers.iter().map(|m| m.to_string()))
            )
        })
        .collect();
    let exports: Vec<String> = descriptor
        .exports
        .iter()
        .map(|e| {
            let targets = match &e.targets {
                Some(targets) => braced(targets),
                None => "{}".to_string(),
            };
            format!("{} : {}", e.source, targets)
        })
        .collect();
    let provides: Vec<String> = descriptor
        .provides
        .iter()
        .map(|p| format!("{} : {}", p.service, braced(&p.providers)))
        .collect();

    out.push_str(&format!(
        "\nname: {}\nautomatic: {}\nrequires: \n{}\nexports: \n{}\nprovides: \n{}\nuses: {}",
        descriptor.name,
        descriptor.is_automatic(),
        requires.join("\n"),
        exports.join("\n"),
        provides.join("\n"),
        braced(&descriptor.uses)
    ));
    out
}
