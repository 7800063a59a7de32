//! Folding measured jobs into a result document.

use std::collections::HashMap;

use cxh_common::{Job, MetricRecord};

use crate::document::{FileEntry, ProjectEntry, ResultDocument, ResultRow, Variant};

/// Builds the result document from input-ordered (job, record) pairs.
///
/// A new project entry opens whenever (project, version) differs from the
/// previous pair's, and a new file entry whenever the file name differs, so
/// the input is expected to be sorted by project then file. Variants are keyed
/// by compiler and argument string; the first job seen for a key supplies the
/// variant's metadata.
pub fn build_document(results: &[(&Job, &MetricRecord)]) -> ResultDocument {
    let mut doc = ResultDocument::default();
    let mut variant_index: HashMap<String, usize> = HashMap::new();

    for (job, record) in results {
        let args = job.arg_string();
        let key = format!("{} {}", job.compiler, args);
        let variant = *variant_index.entry(key).or_insert_with(|| {
            doc.variants.push(Variant {
                name: job.variant.clone(),
                compiler_name: job.compiler_name.clone(),
                compiler_path: job.compiler.clone(),
                compiler_version: record.compiler_version.clone(),
                cpp: job.cpp,
                args,
            });
            doc.variants.len() - 1
        });

        let same_project = doc
            .projects
            .last()
            .is_some_and(|p| p.name == job.project && p.version == job.version);
        if !same_project {
            doc.projects.push(ProjectEntry {
                name: job.project.clone(),
                version: job.version.clone(),
                url: job.project_url.clone(),
                category: job.category.clone(),
                files: Vec::new(),
            });
        }
        // a project entry exists from here on
        let Some(project) = doc.projects.last_mut() else {
            continue;
        };

        if project.files.last().map(|f| f.name.as_str()) != Some(job.name.as_str()) {
            project.files.push(FileEntry {
                name: job.name.clone(),
                url: job.url.clone(),
                results: Vec::new(),
            });
        }
        if let Some(file) = project.files.last_mut() {
            file.results.push(row(variant as u64, record));
        }
    }

    doc
}

fn row(variant: u64, r: &MetricRecord) -> ResultRow {
    let s = &r.symbols;
    ResultRow {
        variant,
        compile_ms: millis(r.compile_time),
        compile_base_ms: millis(r.compile_time_base),
        preprocess_ms: millis(r.preprocessing_time),
        preprocess_base_ms: millis(r.preprocessing_time_base),
        line_count: r.line_count,
        line_count_raw: r.line_count_raw,
        object_size: r.object_size,
        object_size_base: r.object_size_base,
        text_size: r.sections.text,
        data_size: r.sections.data,
        bss_size: r.sections.bss,
        string_size: r.string_size,
        code_symbol_size: s.code.size,
        data_symbol_size: s.data.size,
        weak_symbol_size: s.weak.size,
        symbol_name_size: s.total_name_length(),
        string_count: r.string_count,
        undefined_symbol_count: s.undefined.count,
        code_symbol_count: s.code.count,
        data_symbol_count: s.data.count,
        weak_symbol_count: s.weak.count,
    }
}

/// Whole milliseconds, truncated toward zero.
fn millis(secs: f64) -> u64 {
    (secs * 1000.0) as u64
}
