//! End-to-end rewrites of PHP factory sources

use bumpalo::Bump;
use helperize_core::{apply_edits, ClassHierarchy, Edit};
use helperize_rules::{collect_declarations, check_faker_helper};
use mago_database::file::FileId;

const HEADER: &str = r#"<?php

namespace Database\Factories;

use Illuminate\Database\Eloquent\Factories\Factory;
"#;

fn check_with(source: &str, hierarchy: &ClassHierarchy) -> Vec<Edit> {
    let arena = Bump::new();
    let file_id = FileId::new("factory.php");
    let (program, _) = mago_syntax::parser::parse_file_content(&arena, file_id, source);
    check_faker_helper(program, source, hierarchy)
}

fn transform_with(source: &str, hierarchy: &ClassHierarchy) -> String {
    let edits = check_with(source, hierarchy);
    apply_edits(source, &edits).unwrap()
}

fn transform(source: &str) -> String {
    transform_with(source, &ClassHierarchy::new())
}

fn index(source: &str) -> ClassHierarchy {
    let arena = Bump::new();
    let (program, _) =
        mago_syntax::parser::parse_file_content(&arena, FileId::new("index.php"), source);
    let mut hierarchy = ClassHierarchy::new();
    hierarchy.extend(&collect_declarations(program, source));
    hierarchy
}

fn factory(body: &str) -> String {
    format!(
        "{HEADER}\nclass UserFactory extends Factory\n{{\n    public function definition(): array\n    {{\n        return {body};\n    }}\n}}\n"
    )
}

#[test]
fn test_property_after_member() {
    let source = factory("['name' => $this->faker->name]");
    let result = transform(&source);
    assert!(result.contains("return ['name' => fake()->name];"));
}

#[test]
fn test_call_after_member() {
    let source = factory("['email' => $this->faker->unique()->safeEmail]");
    let result = transform(&source);
    assert!(result.contains("return ['email' => fake()->unique()->safeEmail];"));
}

#[test]
fn test_excluded_call_unchanged() {
    let source = factory("['e' => $this->faker->randomEnum(Suit::class)]");
    assert!(check_with(&source, &ClassHierarchy::new()).is_empty());
}

#[test]
fn test_excluded_call_any_case() {
    let source = factory("['e' => $this->faker->RandomEnum(Suit::class)]");
    assert!(check_with(&source, &ClassHierarchy::new()).is_empty());
}

#[test]
fn test_outside_factory_unchanged() {
    let source = r#"<?php
namespace App\Support;

class Generator
{
    public function row(): array
    {
        return ['name' => $this->faker->name];
    }
}
"#;
    assert!(check_with(source, &ClassHierarchy::new()).is_empty());
}

#[test]
fn test_interpolated_string_unchanged() {
    let source = factory(r#"['note' => "value is {$this->faker->name}"]"#);
    assert!(check_with(&source, &ClassHierarchy::new()).is_empty());
}

#[test]
fn test_bare_member_unchanged() {
    let source = factory("['generator' => $this->faker]");
    assert!(check_with(&source, &ClassHierarchy::new()).is_empty());
}

#[test]
fn test_dynamic_member_unchanged() {
    let source = factory("['name' => $this->{'faker'}->name]");
    assert!(check_with(&source, &ClassHierarchy::new()).is_empty());
}

#[test]
fn test_legacy_array_syntax() {
    let source = factory("array('name' => $this->faker->name(), 'age' => $this->faker->numberBetween(18, 99))");
    let result = transform(&source);
    assert!(result.contains(
        "return array('name' => fake()->name(), 'age' => fake()->numberBetween(18, 99));"
    ));
}

#[test]
fn test_concatenation_and_nested_arguments() {
    let source = factory(
        "['title' => 'Dr. ' . $this->faker->lastName, 'meta' => json_encode(['bio' => $this->faker->sentence])]",
    );
    let result = transform(&source);
    assert!(result.contains("'title' => 'Dr. ' . fake()->lastName"));
    assert!(result.contains("json_encode(['bio' => fake()->sentence])"));
}

#[test]
fn test_array_inside_closure() {
    let source = format!(
        r#"{HEADER}
class UserFactory extends Factory
{{
    public function unverified(): static
    {{
        return $this->state(function (array $attributes) {{
            return ['email_verified_at' => null, 'token' => $this->faker->uuid];
        }});
    }}
}}
"#
    );
    let result = transform(&source);
    assert!(result.contains("'token' => fake()->uuid"));
}

#[test]
fn test_array_in_method_argument() {
    let source = format!(
        r#"{HEADER}
class UserFactory extends Factory
{{
    public function admin(): static
    {{
        return $this->state(['role' => $this->faker->randomElement(['admin', 'owner'])]);
    }}
}}
"#
    );
    let result = transform(&source);
    assert!(result.contains("$this->state(['role' => fake()->randomElement(['admin', 'owner'])])"));
}

#[test]
fn test_multi_level_hierarchy_in_one_file() {
    let source = format!(
        r#"{HEADER}
abstract class BaseFactory extends Factory
{{
}}

class PostFactory extends BaseFactory
{{
    public function definition(): array
    {{
        return ['title' => $this->faker->sentence];
    }}
}}
"#
    );
    let result = transform(&source);
    assert!(result.contains("'title' => fake()->sentence"));
}

#[test]
fn test_hierarchy_across_files() {
    let base = r#"<?php
namespace Database\Factories;

use Illuminate\Database\Eloquent\Factories\Factory;

abstract class BaseFactory extends Factory {}
"#;
    let child = r#"<?php
namespace Database\Factories\Blog;

use Database\Factories\BaseFactory;

class CommentFactory extends BaseFactory
{
    public function definition(): array
    {
        return ['body' => $this->faker->paragraph];
    }
}
"#;

    assert!(check_with(child, &ClassHierarchy::new()).is_empty());

    let hierarchy = index(base);
    let result = transform_with(child, &hierarchy);
    assert!(result.contains("'body' => fake()->paragraph"));
}

#[test]
fn test_rewrite_is_idempotent() {
    let source = factory(
        "['name' => $this->faker->name, 'email' => $this->faker->unique()->safeEmail(), 'e' => $this->faker->randomEnum(Suit::class)]",
    );
    let once = transform(&source);
    assert!(once.contains("'name' => fake()->name"));
    assert!(once.contains("'e' => $this->faker->randomEnum(Suit::class)"));

    assert!(check_with(&once, &ClassHierarchy::new()).is_empty());
}

#[test]
fn test_only_factory_class_in_mixed_file() {
    let source = format!(
        r#"{HEADER}
class Helper
{{
    public function data(): array
    {{
        return ['a' => $this->faker->word];
    }}
}}

class TagFactory extends Factory
{{
    public function definition(): array
    {{
        return ['b' => $this->faker->word];
    }}
}}
"#
    );
    let result = transform(&source);
    assert!(result.contains("['a' => $this->faker->word]"));
    assert!(result.contains("['b' => fake()->word]"));
}

#[test]
fn test_closure_value_in_array() {
    let source = factory("['title' => function () { return $this->faker->sentence; }]");
    let result = transform(&source);
    assert!(result.contains("'title' => function () { return fake()->sentence; }"));
}

#[test]
fn test_instantiation_argument() {
    let source = factory("['at' => new DateTime($this->faker->date)]");
    let result = transform(&source);
    assert!(result.contains("'at' => new DateTime(fake()->date)"));
}

#[test]
fn test_match_subject_and_arms() {
    let source = factory(
        "['s' => match ($this->faker->boolean) { true => $this->faker->word, default => 'none' }]",
    );
    let result = transform(&source);
    assert!(result.contains(
        "'s' => match (fake()->boolean) { true => fake()->word, default => 'none' }"
    ));
}

#[test]
fn test_array_inside_instantiation() {
    let source = factory("['m' => new Collection(['w' => $this->faker->word])]");
    let edits = check_with(&source, &ClassHierarchy::new());
    assert_eq!(edits.len(), 1);

    let result = apply_edits(&source, &edits).unwrap();
    assert!(result.contains("'m' => new Collection(['w' => fake()->word])"));
}

#[test]
fn test_exclusion_only_checked_on_direct_call() {
    let source = factory("['e' => $this->faker->unique()->randomEnum(Suit::class)]");
    let result = transform(&source);
    assert!(result.contains("'e' => fake()->unique()->randomEnum(Suit::class)"));
}
