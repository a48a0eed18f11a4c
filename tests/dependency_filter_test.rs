//! Dependency-set filtering over resolved candidates

mod support;

use jlinkpath::config::LinkPathConfig;
use jlinkpath::filter::{DependencySet, Reason};
use jlinkpath::project::{Artifact, Scope};
use jlinkpath::{resolve_module_path, Resolution};
use support::{ModuleInfo, Project};
use yare::parameterized;

/// Output module `app`, three jars under `libs/` and one under `ext/`.
fn fixture() -> (Project, LinkPathConfig) {
    let project = Project::new();
    project.compile_main_module(&ModuleInfo::new("app").requires("org.alpha"));
    let artifacts = vec![
        project.modular_jar("libs/org-alpha.jar", &ModuleInfo::new("org.alpha")),
        project.modular_jar("libs/org-beta.jar", &ModuleInfo::new("org.beta")),
        project.manifest_jar("libs/auto.jar", "com.auto"),
        project.modular_jar("ext/gamma.jar", &ModuleInfo::new("net.gamma")),
    ];

    let config = LinkPathConfig {
        project_root: Some(project.root().to_path_buf()),
        artifacts: artifacts
            .into_iter()
            .map(|p| Artifact::new(p, Scope::Compile))
            .collect(),
        ..Default::default()
    };
    (project, config)
}

fn resolve_with(config: &mut LinkPathConfig, sets: &[&str]) -> Resolution {
    config.module_path.dependency_sets = sets
        .iter()
        .map(|s| toml::from_str::<DependencySet>(s).unwrap())
        .collect();
    resolve_module_path(config).unwrap()
}

fn selected_names(resolution: &Resolution) -> Vec<String> {
    resolution
        .assembly
        .module_path
        .dependency_sets
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect()
}

#[parameterized(
    empty_set = { "", &["org-alpha.jar", "org-beta.jar", "auto.jar", "gamma.jar"] },
    include_output = { "include_output = true", &["classes", "org-alpha.jar", "org-beta.jar", "auto.jar", "gamma.jar"] },
    exclude_automatic = { "exclude_automatic = true", &["org-alpha.jar", "org-beta.jar", "gamma.jar"] },
    path_glob = { r#"includes = ["glob:**/ext/*.jar"]"# , &["gamma.jar"] },
    unprefixed_path_glob = { r#"includes = ["**/libs/org-*.jar"]"#, &["org-alpha.jar", "org-beta.jar"] },
    name_regex = { r#"include_names = ['org\..*']"#, &["org-alpha.jar", "org-beta.jar"] },
    name_regex_is_full_match = { r#"include_names = ["org"]"#, &[] },
    name_alternation = { r#"include_names = ['org\.beta|net\..*']"#, &["org-beta.jar", "gamma.jar"] },
    exclude_by_name = { r#"exclude_names = ['.*\.beta']"#, &["org-alpha.jar", "auto.jar", "gamma.jar"] },
    include_path_or_name = { "includes = [\"**/ext/*.jar\"]\ninclude_names = [\"com.auto\"]", &["auto.jar", "gamma.jar"] },
    include_then_exclude = { "includes = [\"**/*.jar\"]\nexcludes = [\"**/libs/org-*.jar\"]", &["auto.jar", "gamma.jar"] },
    exclude_automatic_beats_include_output = { "exclude_automatic = true\ninclude_output = true\ninclude_names = [\"net.*\"]", &["classes", "gamma.jar"] },
)]
fn test_single_dependency_set(set: &str, expected: &[&str]) {
    let (_project, mut config) = fixture();
    let resolution = resolve_with(&mut config, &[set]);
    assert_eq!(selected_names(&resolution), expected);
}

#[test]
fn test_no_dependency_set_excludes_only_output() {
    let (_project, mut config) = fixture();
    let resolution = resolve_with(&mut config, &[]);

    assert_eq!(
        selected_names(&resolution),
        vec!["org-alpha.jar", "org-beta.jar", "auto.jar", "gamma.jar"]
    );
    let decisions = &resolution.assembly.selection.decisions;
    assert_eq!(decisions[0].reason(), Some(Reason::OutputExcludedByDefault));
    assert_eq!(decisions[1].reason(), Some(Reason::IncludedByDefault));
}

#[test]
fn test_sets_are_unioned_in_candidate_order() {
    let (_project, mut config) = fixture();
    let resolution = resolve_with(
        &mut config,
        &[
            r#"includes = ["**/ext/*.jar"]"#,
            r#"include_names = ["com.auto", "net.gamma"]"#,
        ],
    );

    assert_eq!(selected_names(&resolution), vec!["auto.jar", "gamma.jar"]);

    let gamma = &resolution.assembly.selection.decisions[4];
    assert!(gamma.included);
    assert_eq!(gamma.verdicts.len(), 2);
    assert!(gamma.verdicts.iter().all(|v| v.included));
}

#[test]
fn test_decision_reasons() {
    let (_project, mut config) = fixture();
    let resolution = resolve_with(
        &mut config,
        &[r#"
exclude_automatic = true
include_names = ["org.*", "net.*"]
exclude_names = ["net.*"]
"#],
    );

    let reasons: Vec<Option<Reason>> = resolution
        .assembly
        .selection
        .decisions
        .iter()
        .map(|d| d.reason())
        .collect();
    assert_eq!(
        reasons,
        vec![
            Some(Reason::OutputExcluded),
            Some(Reason::MatchedIncludes),
            Some(Reason::MatchedIncludes),
            Some(Reason::AutomaticExcluded),
            Some(Reason::MatchedByExcludes),
        ]
    );
}

#[test]
fn test_candidate_without_descriptor_matches_empty_name() {
    let (project, mut config) = fixture();
    let legacy = project.path("legacy");
    std::fs::create_dir_all(legacy.join("org/example")).unwrap();
    config.system_dependencies = vec![legacy];

    let by_org = resolve_with(&mut config, &[r#"include_names = ['org\..*']"#]);
    assert_eq!(
        selected_names(&by_org),
        vec!["org-alpha.jar", "org-beta.jar"]
    );

    let anything = resolve_with(&mut config, &[r#"include_names = [".*"]"#]);
    assert_eq!(selected_names(&anything).last().unwrap(), "legacy");
    assert_eq!(
        anything.resolved.candidates().last().unwrap().module_name(),
        ""
    );
}
