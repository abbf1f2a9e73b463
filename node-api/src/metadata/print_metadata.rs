/*
	Copyright 2021 Integritee AG and Supercomputing Systems AG
	Licensed under the Apache License, Version 2.0 (the "License");
	you may not use this file except in compliance with the License.
	You may obtain a copy of the License at
		http://www.apache.org/licenses/LICENSE-2.0
	Unless required by applicable law or agreed to in writing, software
	distributed under the License is distributed on an "AS IS" BASIS,
	WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
	See the License for the specific language governing permissions and
	limitations under the License.
*/

use crate::metadata::{ModuleErrorTable, PalletErrors};

impl ModuleErrorTable {
	/// One line per pallet, followed by its errors.
	pub fn overview(&self) -> String {
		let mut string = String::new();
		for pallet in self.pallets() {
			string.push_str(&format!("{} ({})\n", pallet.name, pallet.index));
			for error in &pallet.errors {
				string.push_str(&format!(" err {:>3}  {}\n", error.index, error.name));
			}
		}
		string
	}

	pub fn print_overview(&self) {
		println!("{}", self.overview());
	}
}

impl PalletErrors {
	pub fn print_errors(&self) {
		println!("----------------- Errors for Pallet: {} ({}) -----------------\n", self.name, self.index);
		for variant in &self.errors {
			println!("Name: {}, index {}", variant.name, variant.index);
			if !variant.docs.is_empty() {
				println!("Docs: {:?}", variant.docs);
			}
			println!();
		}
		println!();
	}
}

#[cfg(test)]
mod tests {
	use crate::test_utils::module_error_table;

	#[test]
	fn overview_lists_pallets_and_errors() {
		let overview = module_error_table().overview();
		let lines: Vec<_> = overview.lines().collect();

		assert_eq!(lines[0], "System (0)");
		assert!(lines.contains(&"Balances (3)"));
		assert!(lines.contains(&" err   2  InsufficientBalance"));
	}
}
