//! Tests for address/line/name location resolution.

mod common;

use std::collections::BTreeMap;

use common::*;
use loupe_symbols::eval::EvalResult;
use loupe_symbols::identifier::{Identifier, IdentifierComponent, SpecialName};
use loupe_symbols::location::{AmbiguousInlineMode, InputLocation, ModuleSymbols, ResolveOptions};
use loupe_symbols::module::{ElfSymbolRecord, ElfSymbols, EntryId, LineRow, LineTable};
use loupe_symbols::types::{Address, FileLine, LocationSymbol, SymbolContext, VariableLocation};
use loupe_symbols::SymbolIndex;

fn rows(rows: Vec<LineRow>) -> LineTable
{
    LineTable::new(rows)
}

#[test]
fn test_address_resolves_function_and_line()
{
    let mut unit = UnitBuilder::new("a.cc", "/src");
    let func = unit.add(0, function("compute", 0x100, 0x180));
    unit.set_line_table(rows(vec![
        LineRow::new(0x100, 0, 10),
        LineRow::new(0x110, 0, 11),
        LineRow::end_sequence(0x180),
    ]));

    let info = module(vec![unit.build()]);
    let index = SymbolIndex::build(&info);
    let evaluator = MapEvaluator::new();
    let symbols = ModuleSymbols::new(&info, &index, &evaluator);

    let context = SymbolContext::RELATIVE;
    let locations = symbols.resolve_input_location(
        &context,
        &InputLocation::Address(Address::from(0x114)),
        &ResolveOptions::default(),
    );

    assert_eq!(locations.len(), 1);
    let location = &locations[0];
    assert!(location.is_symbolized());
    assert_eq!(location.address(), Address::from(0x114));
    let file_line = location.file_line().expect("should resolve a line");
    assert_eq!(file_line.file, "a.cc");
    assert_eq!(file_line.line, 11);
    match location.symbol() {
        Some(LocationSymbol::Function(symbol_ref)) => {
            assert_eq!(symbol_ref.entry_index(), func);
        }
        other => panic!("expected a function symbol, got {other:?}"),
    }
}

#[test]
fn test_address_only_when_symbolize_off()
{
    let mut unit = UnitBuilder::new("a.cc", "/src");
    unit.add(0, function("compute", 0x100, 0x180));
    let info = module(vec![unit.build()]);
    let index = SymbolIndex::build(&info);
    let evaluator = MapEvaluator::new();
    let symbols = ModuleSymbols::new(&info, &index, &evaluator);

    let options = ResolveOptions {
        symbolize: false,
        ..ResolveOptions::default()
    };
    let locations = symbols.resolve_input_location(
        &SymbolContext::RELATIVE,
        &InputLocation::Address(Address::from(0x110)),
        &options,
    );
    assert_eq!(locations.len(), 1);
    assert!(!locations[0].is_symbolized());
    assert!(locations[0].symbol().is_none());
}

#[test]
fn test_unknown_address_is_symbolized_no_match()
{
    let info = module(vec![UnitBuilder::new("a.cc", "/src").build()]);
    let index = SymbolIndex::build(&info);
    let evaluator = MapEvaluator::new();
    let symbols = ModuleSymbols::new(&info, &index, &evaluator);

    let locations = symbols.resolve_input_location(
        &SymbolContext::RELATIVE,
        &InputLocation::Address(Address::from(0xdead)),
        &ResolveOptions::default(),
    );
    assert_eq!(locations.len(), 1);
    assert!(locations[0].is_symbolized());
    assert!(locations[0].symbol().is_none());
}

#[test]
fn test_load_address_translation()
{
    let mut unit = UnitBuilder::new("a.cc", "/src");
    unit.add(0, function("compute", 0x100, 0x180));
    unit.set_line_table(rows(vec![
        LineRow::new(0x100, 0, 10),
        LineRow::end_sequence(0x180),
    ]));
    let info = module(vec![unit.build()]);
    let index = SymbolIndex::build(&info);
    let evaluator = MapEvaluator::new();
    let symbols = ModuleSymbols::new(&info, &index, &evaluator);

    let context = SymbolContext::new(0x7f0000000000);
    let locations = symbols.resolve_input_location(
        &context,
        &InputLocation::Address(Address::from(0x7f0000000110)),
        &ResolveOptions::default(),
    );
    assert_eq!(locations.len(), 1);
    assert!(locations[0].has_symbol());
    assert_eq!(locations[0].relative_address(), 0x110);

    // Name resolution comes back in absolute space.
    let locations = symbols.resolve_input_location(
        &context,
        &InputLocation::Name(Identifier::parse("compute")),
        &ResolveOptions::default(),
    );
    assert_eq!(locations[0].address(), Address::from(0x7f0000000100));
}

/// A chain of 3 nested inlines at the same start address: inner mode names
/// the innermost instance, outer mode names the physical function at the
/// outermost inline's call site (column unknown).
#[test]
fn test_ambiguous_inline_inner_and_outer()
{
    let mut unit = UnitBuilder::new("a.cc", "/src");
    let origin_one = unit.add(0, abstract_function("one"));
    let origin_two = unit.add(0, abstract_function("two"));
    let origin_three = unit.add(0, abstract_function("three"));
    let physical = unit.add(0, function("physical", 0x100, 0x200));
    let inline_one = unit.add(
        physical,
        inline_instance(
            EntryId::local(origin_one),
            0x120,
            0x180,
            FileLine::new("a.cc", 10).at_column(5),
        ),
    );
    let inline_two = unit.add(
        inline_one,
        inline_instance(EntryId::local(origin_two), 0x120, 0x160, FileLine::new("a.cc", 20)),
    );
    let inline_three = unit.add(
        inline_two,
        inline_instance(EntryId::local(origin_three), 0x120, 0x140, FileLine::new("a.cc", 30)),
    );
    unit.set_line_table(rows(vec![
        LineRow::new(0x100, 0, 5),
        LineRow::new(0x120, 0, 31),
        LineRow::end_sequence(0x200),
    ]));

    let info = module(vec![unit.build()]);
    let index = SymbolIndex::build(&info);
    let evaluator = MapEvaluator::new();
    let symbols = ModuleSymbols::new(&info, &index, &evaluator);
    let context = SymbolContext::RELATIVE;

    // Inner mode: the most specific inline instance, line table position.
    let locations = symbols.resolve_input_location(
        &context,
        &InputLocation::Address(Address::from(0x120)),
        &ResolveOptions::default(),
    );
    match locations[0].symbol() {
        Some(LocationSymbol::Function(symbol_ref)) => {
            assert_eq!(symbol_ref.entry_index(), inline_three);
        }
        other => panic!("expected the innermost inline, got {other:?}"),
    }
    assert_eq!(locations[0].file_line().map(|fl| fl.line), Some(31));

    // Outer mode: the physical function, positioned at the call site of the
    // inline immediately inside it.
    let options = ResolveOptions {
        ambiguous_inline: AmbiguousInlineMode::Outer,
        ..ResolveOptions::default()
    };
    let locations = symbols.resolve_input_location(
        &context,
        &InputLocation::Address(Address::from(0x120)),
        &options,
    );
    match locations[0].symbol() {
        Some(LocationSymbol::Function(symbol_ref)) => {
            assert_eq!(symbol_ref.entry_index(), physical);
        }
        other => panic!("expected the physical function, got {other:?}"),
    }
    let file_line = locations[0].file_line().expect("call site should be used");
    assert_eq!(file_line.line, 10);
    // DWARF does not record columns at call sites.
    assert_eq!(file_line.column, None);

    // Off the ambiguous start address, outer mode behaves like inner.
    let locations = symbols.resolve_input_location(
        &context,
        &InputLocation::Address(Address::from(0x130)),
        &options,
    );
    match locations[0].symbol() {
        Some(LocationSymbol::Function(symbol_ref)) => {
            assert_eq!(symbol_ref.entry_index(), inline_three);
        }
        other => panic!("expected the innermost inline, got {other:?}"),
    }
}

#[test]
fn test_function_name_resolves_with_prologue_skip()
{
    let mut unit = UnitBuilder::new("a.cc", "/src");
    unit.add(0, function("compute", 0x100, 0x140));
    unit.set_line_table(rows(vec![
        LineRow::new(0x100, 0, 10),
        LineRow::new(0x104, 0, 10),
        LineRow::new(0x108, 0, 11),
        LineRow::new(0x120, 0, 12),
        LineRow::end_sequence(0x140),
    ]));

    let info = module(vec![unit.build()]);
    let index = SymbolIndex::build(&info);
    let evaluator = MapEvaluator::new();
    let symbols = ModuleSymbols::new(&info, &index, &evaluator);
    let context = SymbolContext::RELATIVE;

    // Without prologue skipping the location is the function start.
    let locations = symbols.resolve_input_location(
        &context,
        &InputLocation::Name(Identifier::parse("compute")),
        &ResolveOptions::default(),
    );
    assert_eq!(locations[0].address(), Address::from(0x100));
    assert_eq!(locations[0].file_line().map(|fl| fl.line), Some(10));

    // With it, the address advances to the first row on a new line.
    let options = ResolveOptions {
        skip_prologue: true,
        ..ResolveOptions::default()
    };
    let locations = symbols.resolve_input_location(
        &context,
        &InputLocation::Name(Identifier::parse("compute")),
        &options,
    );
    assert_eq!(locations[0].address(), Address::from(0x108));
    assert_eq!(locations[0].file_line().map(|fl| fl.line), Some(11));
}

#[test]
fn test_prologue_size_zero_when_line_never_changes()
{
    let mut unit = UnitBuilder::new("a.cc", "/src");
    unit.add(0, function("stub", 0x100, 0x110));
    unit.set_line_table(rows(vec![
        LineRow::new(0x100, 0, 7),
        LineRow::new(0x108, 0, 7),
        LineRow::end_sequence(0x110),
    ]));

    let info = module(vec![unit.build()]);
    let index = SymbolIndex::build(&info);
    let evaluator = MapEvaluator::new();
    let symbols = ModuleSymbols::new(&info, &index, &evaluator);

    let options = ResolveOptions {
        skip_prologue: true,
        ..ResolveOptions::default()
    };
    let locations = symbols.resolve_input_location(
        &SymbolContext::RELATIVE,
        &InputLocation::Name(Identifier::parse("stub")),
        &options,
    );
    assert_eq!(locations[0].address(), Address::from(0x100));
}

#[test]
fn test_generated_code_line_zero_omits_file()
{
    let mut unit = UnitBuilder::new("a.cc", "/src");
    unit.add(0, function("compute", 0x100, 0x140));
    unit.set_line_table(rows(vec![
        LineRow::new(0x100, 0, 10),
        LineRow::new(0x108, 0, 0),
        LineRow::end_sequence(0x140),
    ]));

    let info = module(vec![unit.build()]);
    let index = SymbolIndex::build(&info);
    let evaluator = MapEvaluator::new();
    let symbols = ModuleSymbols::new(&info, &index, &evaluator);

    let locations = symbols.resolve_input_location(
        &SymbolContext::RELATIVE,
        &InputLocation::Address(Address::from(0x10a)),
        &ResolveOptions::default(),
    );
    assert!(locations[0].file_line().is_none());
    assert!(locations[0].has_symbol());
}

#[test]
fn test_elf_fallback_for_uncovered_addresses()
{
    let mut unit = UnitBuilder::new("a.cc", "/src");
    unit.add(0, function("compute", 0x100, 0x140));
    let symbols_table = ElfSymbols::new(
        vec![
            ElfSymbolRecord {
                name: "memcpy".to_string(),
                relative_address: 0x6000,
                size: 0x100,
            },
            ElfSymbolRecord {
                name: "memset".to_string(),
                relative_address: 0x6200,
                size: 0x100,
            },
        ],
        BTreeMap::new(),
    );
    let info = module_with_symbols(vec![unit.build()], symbols_table);
    let index = SymbolIndex::build(&info);
    let evaluator = MapEvaluator::new();
    let symbols = ModuleSymbols::new(&info, &index, &evaluator);

    let locations = symbols.resolve_input_location(
        &SymbolContext::RELATIVE,
        &InputLocation::Address(Address::from(0x6100)),
        &ResolveOptions::default(),
    );
    assert_eq!(
        locations[0].symbol(),
        Some(&LocationSymbol::Elf("memcpy".to_string()))
    );
}

#[test]
fn test_plt_and_elf_marker_names()
{
    let mut plt = BTreeMap::new();
    plt.insert("strlen".to_string(), 0x4000u64);
    let symbols_table = ElfSymbols::new(
        vec![ElfSymbolRecord {
            name: "g_raw".to_string(),
            relative_address: 0x5000,
            size: 8,
        }],
        plt,
    );
    let info = module_with_symbols(vec![UnitBuilder::new("a.cc", "/src").build()], symbols_table);
    let index = SymbolIndex::build(&info);
    let evaluator = MapEvaluator::new();
    let symbols = ModuleSymbols::new(&info, &index, &evaluator);
    let context = SymbolContext::RELATIVE;

    let plt_marker = Identifier::from_component(IdentifierComponent::special(SpecialName::Plt, "strlen"));
    let locations = symbols.resolve_input_location(
        &context,
        &InputLocation::Name(plt_marker),
        &ResolveOptions::default(),
    );
    assert_eq!(locations[0].address(), Address::from(0x4000));
    assert_eq!(
        locations[0].symbol(),
        Some(&LocationSymbol::Elf("strlen@plt".to_string()))
    );

    let elf_marker = Identifier::from_component(IdentifierComponent::special(SpecialName::Elf, "g_raw"));
    let locations = symbols.resolve_input_location(
        &context,
        &InputLocation::Name(elf_marker),
        &ResolveOptions::default(),
    );
    assert_eq!(locations[0].address(), Address::from(0x5000));
}

#[test]
fn test_main_marker_resolves_flagged_function()
{
    let mut unit = UnitBuilder::new("a.cc", "/src");
    let mut entry = function("app_entry", 0x100, 0x180);
    entry.is_main = true;
    unit.add(0, entry);
    unit.set_line_table(rows(vec![
        LineRow::new(0x100, 0, 3),
        LineRow::end_sequence(0x180),
    ]));

    let info = module(vec![unit.build()]);
    let index = SymbolIndex::build(&info);
    let evaluator = MapEvaluator::new();
    let symbols = ModuleSymbols::new(&info, &index, &evaluator);

    let marker = Identifier::from_component(IdentifierComponent::special(SpecialName::Main, ""));
    let locations = symbols.resolve_input_location(
        &SymbolContext::RELATIVE,
        &InputLocation::Name(marker),
        &ResolveOptions::default(),
    );
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0].address(), Address::from(0x100));
}

#[test]
fn test_static_variable_address_through_evaluator()
{
    let mut unit = UnitBuilder::new("a.cc", "/src");
    let mut counter = variable("g_counter");
    counter.location = Some(VariableLocation::always(vec![0x03, 0x10]));
    counter.decl = Some(FileLine::new("a.cc", 3));
    unit.add(0, counter);
    let mut tls = variable("g_tls");
    tls.location = Some(VariableLocation::always(vec![0x99]));
    unit.add(0, tls);

    let info = module(vec![unit.build()]);
    let index = SymbolIndex::build(&info);
    let evaluator = MapEvaluator::new().with(&[0x03, 0x10], EvalResult::Address(0x9000));
    let symbols = ModuleSymbols::new(&info, &index, &evaluator);
    let context = SymbolContext::RELATIVE;

    let locations = symbols.resolve_input_location(
        &context,
        &InputLocation::Name(Identifier::parse("g_counter")),
        &ResolveOptions::default(),
    );
    assert_eq!(locations[0].address(), Address::from(0x9000));
    assert_eq!(locations[0].file_line().map(|fl| fl.line), Some(3));
    assert!(matches!(locations[0].symbol(), Some(LocationSymbol::Variable(_))));

    // An expression the evaluator cannot answer statically degrades to an
    // unlocated result that still names the variable.
    let locations = symbols.resolve_input_location(
        &context,
        &InputLocation::Name(Identifier::parse("g_tls")),
        &ResolveOptions::default(),
    );
    assert_eq!(locations[0].address(), Address::ZERO);
    assert!(matches!(locations[0].symbol(), Some(LocationSymbol::Variable(_))));
}

#[test]
fn test_line_query_exact_match()
{
    let mut unit = UnitBuilder::new("a.cc", "/src");
    unit.add(0, function("compute", 0x100, 0x180));
    unit.set_line_table(rows(vec![
        LineRow::new(0x100, 0, 20),
        LineRow::new(0x140, 0, 25),
        LineRow::end_sequence(0x180),
    ]));

    let info = module(vec![unit.build()]);
    let index = SymbolIndex::build(&info);
    let evaluator = MapEvaluator::new();
    let symbols = ModuleSymbols::new(&info, &index, &evaluator);

    let locations = symbols.resolve_input_location(
        &SymbolContext::RELATIVE,
        &InputLocation::Line(FileLine::new("a.cc", 20)),
        &ResolveOptions::default(),
    );
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0].address(), Address::from(0x100));
}

/// Requesting a line with no row falls forward to the closest following
/// line, never backward.
#[test]
fn test_line_query_falls_forward_never_backward()
{
    let mut unit = UnitBuilder::new("a.cc", "/src");
    unit.add(0, function("compute", 0x100, 0x180));
    unit.set_line_table(rows(vec![
        LineRow::new(0x100, 0, 20),
        LineRow::new(0x140, 0, 25),
        LineRow::end_sequence(0x180),
    ]));

    let info = module(vec![unit.build()]);
    let index = SymbolIndex::build(&info);
    let evaluator = MapEvaluator::new();
    let symbols = ModuleSymbols::new(&info, &index, &evaluator);

    let locations = symbols.resolve_input_location(
        &SymbolContext::RELATIVE,
        &InputLocation::Line(FileLine::new("a.cc", 22)),
        &ResolveOptions::default(),
    );
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0].address(), Address::from(0x140));
    assert_eq!(locations[0].file_line().map(|fl| fl.line), Some(25));

    // Past the last line there is nothing to fall forward to.
    let locations = symbols.resolve_input_location(
        &SymbolContext::RELATIVE,
        &InputLocation::Line(FileLine::new("a.cc", 26)),
        &ResolveOptions::default(),
    );
    assert!(locations.is_empty());
}

#[test]
fn test_line_query_dedupes_rows_within_a_function()
{
    let mut unit = UnitBuilder::new("a.cc", "/src");
    unit.add(0, function("compute", 0x100, 0x180));
    // The same source line contributes two ranges inside one function (a
    // split loop, for example); only the first row survives.
    unit.set_line_table(rows(vec![
        LineRow::new(0x100, 0, 20),
        LineRow::new(0x120, 0, 21),
        LineRow::new(0x130, 0, 20),
        LineRow::end_sequence(0x180),
    ]));

    let info = module(vec![unit.build()]);
    let index = SymbolIndex::build(&info);
    let evaluator = MapEvaluator::new();
    let symbols = ModuleSymbols::new(&info, &index, &evaluator);

    let locations = symbols.resolve_input_location(
        &SymbolContext::RELATIVE,
        &InputLocation::Line(FileLine::new("a.cc", 20)),
        &ResolveOptions::default(),
    );
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0].address(), Address::from(0x100));
}

#[test]
fn test_line_query_keeps_one_group_per_function()
{
    // Two functions compiled from the same line (a template instantiated
    // twice): both groups survive because they share the smallest line.
    let mut unit = UnitBuilder::new("a.cc", "/src");
    unit.add(0, function("first", 0x100, 0x130));
    unit.add(0, function("second", 0x200, 0x230));
    unit.set_line_table(rows(vec![
        LineRow::new(0x100, 0, 20),
        LineRow::end_sequence(0x130),
        LineRow::new(0x200, 0, 20),
        LineRow::end_sequence(0x230),
    ]));

    let info = module(vec![unit.build()]);
    let index = SymbolIndex::build(&info);
    let evaluator = MapEvaluator::new();
    let symbols = ModuleSymbols::new(&info, &index, &evaluator);

    let locations = symbols.resolve_input_location(
        &SymbolContext::RELATIVE,
        &InputLocation::Line(FileLine::new("a.cc", 20)),
        &ResolveOptions::default(),
    );
    assert_eq!(locations.len(), 2);
}

#[test]
fn test_line_query_keeps_only_smallest_resolved_line()
{
    // Unit A can only answer with line 25, unit B with line 23; the global
    // minimum wins and unit A's group is dropped.
    let mut unit_a = UnitBuilder::new("a.cc", "/src");
    unit_a.add(0, function("first", 0x100, 0x130));
    unit_a.set_line_table(rows(vec![
        LineRow::new(0x100, 0, 25),
        LineRow::end_sequence(0x130),
    ]));

    let mut unit_b = UnitBuilder::new("a.cc", "/src");
    unit_b.add(0, function("second", 0x200, 0x230));
    unit_b.set_line_table(rows(vec![
        LineRow::new(0x200, 0, 23),
        LineRow::end_sequence(0x230),
    ]));

    let info = module(vec![unit_a.build(), unit_b.build()]);
    let index = SymbolIndex::build(&info);
    let evaluator = MapEvaluator::new();
    let symbols = ModuleSymbols::new(&info, &index, &evaluator);

    let locations = symbols.resolve_input_location(
        &SymbolContext::RELATIVE,
        &InputLocation::Line(FileLine::new("a.cc", 22)),
        &ResolveOptions::default(),
    );
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0].file_line().map(|fl| fl.line), Some(23));
}

/// Every function's start address symbolizes back to itself, and the
/// resolved name looks the function up again by exact match.
#[test]
fn test_function_round_trip()
{
    let mut unit = UnitBuilder::new("a.cc", "/src");
    unit.add(0, function("alpha", 0x100, 0x140));
    let ns = unit.add(0, namespace("ns"));
    unit.add(ns, function("beta", 0x200, 0x240));
    unit.set_line_table(rows(vec![
        LineRow::new(0x100, 0, 10),
        LineRow::end_sequence(0x140),
        LineRow::new(0x200, 0, 20),
        LineRow::end_sequence(0x240),
    ]));

    let info = module(vec![unit.build()]);
    let index = SymbolIndex::build(&info);
    let evaluator = MapEvaluator::new();
    let symbols = ModuleSymbols::new(&info, &index, &evaluator);
    let context = SymbolContext::RELATIVE;

    for (name, start) in [("alpha", 0x100u64), ("ns::beta", 0x200)] {
        let locations = symbols.resolve_input_location(
            &context,
            &InputLocation::Address(Address::from(start)),
            &ResolveOptions::default(),
        );
        let Some(LocationSymbol::Function(resolved)) = locations[0].symbol() else {
            panic!("expected a function at {start:#x}");
        };
        let refs = index.find_exact(&Identifier::parse(name));
        assert!(
            refs.contains(resolved),
            "{name} did not round-trip through its start address"
        );
    }
}
